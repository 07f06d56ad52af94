//! 地理位置服务模块
//!
//! - `provider`: 出站查询接口
//! - `ipstack`: ipstack HTTP 实现
//! - `response`: 响应结构与成功/失败判定

mod ipstack;
mod provider;
mod response;

pub use ipstack::IpstackProvider;
pub use provider::GeoProvider;
pub use response::{
    Language, LocationDetails, LocationRecord, ProviderErrorDetail, ProviderErrorRecord,
    parse_provider_body,
};
