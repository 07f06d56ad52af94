//! ipstack 响应结构
//!
//! 成功与失败两种 JSON 形态。判定规则：先按失败结构解析，
//! 失败结构为全零值时才按成功结构解析。

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{GeolocatorError, Result};

/// `null` 与缺失字段一律解析为类型默认值
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// 查询成功的地理位置记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ip: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub ip_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub continent_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub continent_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zip: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: LocationDetails,
}

/// 国家级补充信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub geoname_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capital: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<Language>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_flag: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_flag_emoji: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_flag_emoji_unicode: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub calling_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_eu: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub native: String,
}

/// ipstack 失败响应
///
/// 全零值（`Default`）表示"不是错误"。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderErrorRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub error: ProviderErrorDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderErrorDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub error_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: String,
}

impl ProviderErrorRecord {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// 解析 ipstack 响应体
///
/// - 非法 JSON 或结构不符 → `Parse`
/// - 失败结构非零值 → `Provider`，消息为 `error.info`
/// - 否则按成功结构解析
///
/// 字面量 `null` 视为全零值，即空的成功记录。
pub fn parse_provider_body(body: &str) -> Result<LocationRecord> {
    let failure = serde_json::from_str::<Option<ProviderErrorRecord>>(body)?.unwrap_or_default();

    if !failure.is_zero() {
        return Err(GeolocatorError::provider(failure.error.info));
    }

    Ok(serde_json::from_str::<Option<LocationRecord>>(body)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUCCESS_BODY: &str = r#"{
        "ip": "8.8.8.8",
        "type": "ipv4",
        "continent_code": "NA",
        "continent_name": "North America",
        "country_code": "US",
        "country_name": "United States",
        "region_code": "OH",
        "region_name": "Ohio",
        "city": "Glenmont",
        "zip": "44628",
        "latitude": 40.5369987487793,
        "longitude": -82.12859344482422,
        "location": {
            "geoname_id": null,
            "capital": "Washington D.C.",
            "languages": [{"code": "en", "name": "English", "native": "English"}],
            "country_flag": "https://assets.ipstack.com/flags/us.svg",
            "country_flag_emoji": "🇺🇸",
            "country_flag_emoji_unicode": "U+1F1FA U+1F1F8",
            "calling_code": "1",
            "is_eu": false
        }
    }"#;

    const ERROR_BODY: &str = r#"{
        "success": false,
        "error": {
            "code": 101,
            "type": "invalid_access_key",
            "info": "You have not supplied a valid API Access Key."
        }
    }"#;

    #[test]
    fn test_parse_success_payload() {
        let record = parse_provider_body(SUCCESS_BODY).unwrap();
        assert_eq!(record.ip, "8.8.8.8");
        assert_eq!(record.ip_type, "ipv4");
        assert_eq!(record.country_name, "United States");
        assert_eq!(record.location.geoname_id, 0);
        assert_eq!(record.location.languages.len(), 1);
        assert_eq!(record.location.languages[0].native, "English");
        assert!(!record.location.is_eu);
    }

    #[test]
    fn test_parse_error_payload() {
        let err = parse_provider_body(ERROR_BODY).unwrap_err();
        assert_eq!(
            err,
            GeolocatorError::provider("You have not supplied a valid API Access Key.")
        );
    }

    #[test]
    fn test_success_flag_alone_counts_as_error() {
        // 任何非零字段都视为失败，即使没有消息
        let err = parse_provider_body(r#"{"success": true}"#).unwrap_err();
        assert_eq!(err, GeolocatorError::provider(""));
    }

    #[test]
    fn test_empty_object_is_success_with_zero_values() {
        let record = parse_provider_body("{}").unwrap();
        assert_eq!(record, LocationRecord::default());
    }

    #[test]
    fn test_null_body_is_empty_success() {
        assert_eq!(parse_provider_body("null").unwrap(), LocationRecord::default());
        assert_eq!(parse_provider_body(" null\n").unwrap(), LocationRecord::default());
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        assert!(matches!(
            parse_provider_body("<html>502</html>"),
            Err(GeolocatorError::Parse(_))
        ));
        assert!(matches!(
            parse_provider_body(r#"{"error": "nope"}"#),
            Err(GeolocatorError::Parse(_))
        ));
        assert!(matches!(
            parse_provider_body(r#"{"ip": 42}"#),
            Err(GeolocatorError::Parse(_))
        ));
    }

    #[test]
    fn test_cache_round_trip() {
        let record = parse_provider_body(SUCCESS_BODY).unwrap();
        let serialized = serde_json::to_string(&record).unwrap();
        let restored: LocationRecord = serde_json::from_str(&serialized).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(LocationRecord::default()).unwrap();
        assert!(value.get("type").is_some());
        assert!(value.get("ip_type").is_none());
        assert!(value["location"].get("country_flag_emoji_unicode").is_some());
        assert_eq!(value["location"]["languages"], serde_json::json!([]));
    }
}
