//! 字节段缓存相关错误

/// 缓存操作错误类型
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// 单次写入超过缓存上限
    #[error("缓存大小超限: requested={requested}B, limit={limit}B")]
    SizeLimit { requested: u64, limit: u64 },

    /// 文件操作失败
    #[error("文件操作失败: {0}")]
    FileOp(#[from] std::io::Error),

    /// 序列化失败
    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit_display() {
        let err = CacheError::SizeLimit {
            requested: 2048,
            limit: 1024,
        };
        assert_eq!(err.to_string(), "缓存大小超限: requested=2048B, limit=1024B");
    }

    #[test]
    fn test_file_op_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "拒绝访问");
        let err: CacheError = io_err.into();
        assert!(err.to_string().contains("拒绝访问"));
    }
}
