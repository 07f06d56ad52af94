use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{Either, HttpRequest, HttpResponse, web};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::errors::{GeolocatorError, Result};
use crate::services::{LocationRecord, LookupService};
use crate::utils::ip::{UNKNOWN_CALLER_MESSAGE, extract_caller_ip, validate_ip};

const IPADDRESS_FIELD: &str = "ipaddress";

/// `/getlocation` 的表单字段
#[derive(Debug, Default, Deserialize)]
pub struct LocationForm {
    #[serde(default)]
    pub ipaddress: Option<String>,
}

/// 失败时的响应体：`{"error": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// 位置查询 HTTP 入口
///
/// 应用层错误一律返回 200 + `{"error": ...}`，只有方法不匹配返回 405。
pub struct LocationService;

impl LocationService {
    /// `POST /getlocation`
    ///
    /// 请求体（urlencoded 或 multipart）中的字段优先，其次 query string。
    pub async fn get_location(
        body: Option<Either<web::Form<LocationForm>, Multipart>>,
        query: Option<web::Query<LocationForm>>,
        lookup: web::Data<Arc<LookupService>>,
    ) -> HttpResponse {
        let from_body = match body {
            Some(Either::Left(form)) => form.into_inner().ipaddress,
            Some(Either::Right(multipart)) => Self::multipart_ipaddress(multipart).await,
            None => None,
        };

        let ip = from_body
            .or_else(|| query.and_then(|q| q.into_inner().ipaddress))
            .unwrap_or_default();

        Self::respond(Self::validated_lookup(&ip, &lookup).await)
    }

    /// `POST /getmylocation`，IP 从请求头或连接推断
    pub async fn get_my_location(
        req: HttpRequest,
        lookup: web::Data<Arc<LookupService>>,
    ) -> HttpResponse {
        let result = match extract_caller_ip(&req) {
            Some(ip) => Self::validated_lookup(&ip, &lookup).await,
            None => Err(GeolocatorError::validation(UNKNOWN_CALLER_MESSAGE)),
        };

        Self::respond(result)
    }

    /// 读取 multipart 中第一个 `ipaddress` 字段，其余字段跳过
    ///
    /// 不是合法 multipart（包括没有 Content-Type）时返回 None。
    async fn multipart_ipaddress(mut payload: Multipart) -> Option<String> {
        while let Some(item) = payload.next().await {
            let mut field = match item {
                Ok(field) => field,
                Err(e) => {
                    debug!("Request body is not usable multipart: {}", e);
                    return None;
                }
            };

            let field_name = field.name().unwrap_or("").to_string();
            let mut value = Vec::new();
            while let Some(chunk) = field.next().await {
                match chunk {
                    Ok(bytes) => value.extend_from_slice(&bytes),
                    Err(e) => {
                        debug!("Failed to read multipart field '{}': {}", field_name, e);
                        return None;
                    }
                }
            }

            if field_name == IPADDRESS_FIELD {
                return String::from_utf8(value).ok();
            }
        }

        None
    }

    /// 非 POST 请求：405，空响应体
    pub async fn method_not_allowed() -> HttpResponse {
        HttpResponse::MethodNotAllowed().finish()
    }

    async fn validated_lookup(ip: &str, lookup: &LookupService) -> Result<LocationRecord> {
        validate_ip(ip)?;
        lookup.lookup(ip).await
    }

    fn respond(result: Result<LocationRecord>) -> HttpResponse {
        match result {
            Ok(record) => HttpResponse::Ok().json(record),
            Err(e) => Self::error_response(&e),
        }
    }

    /// 统一的错误出口
    fn error_response(err: &GeolocatorError) -> HttpResponse {
        match err {
            GeolocatorError::Validation(_) => debug!("Lookup rejected: {}", err),
            GeolocatorError::Provider(_) => info!("Lookup failed: {}", err),
            GeolocatorError::Transport(_) | GeolocatorError::Parse(_) => {
                warn!("Lookup failed: {}", err)
            }
            GeolocatorError::Cache(_) | GeolocatorError::Config(_) => {
                error!("Lookup failed unexpectedly: {}", err)
            }
        }

        HttpResponse::Ok().json(ErrorBody {
            error: err.message().to_string(),
        })
    }
}

pub fn location_routes() -> actix_web::Scope {
    web::scope("")
        .service(
            web::resource("/getlocation")
                .route(web::post().to(LocationService::get_location))
                .default_service(web::to(LocationService::method_not_allowed)),
        )
        .service(
            web::resource("/getmylocation")
                .route(web::post().to(LocationService::get_my_location))
                .default_service(web::to(LocationService::method_not_allowed)),
        )
}
