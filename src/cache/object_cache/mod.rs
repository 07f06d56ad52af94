mod moka;
mod redis;

pub use self::moka::MokaLocationCache;
pub use self::redis::RedisLocationCache;
