//! 一次性验证码
//!
//! 6 位十进制验证码。库里只存 SHA-256 摘要，查找按 (email, 摘要)
//! 等值匹配，因此不能使用带盐哈希。

use data_encoding::HEXLOWER;
use rand::Rng;
use ring::digest::{digest, SHA256};

pub const CODE_LENGTH: usize = 6;

/// 生成 6 位十进制验证码
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// 验证码的 SHA-256 摘要
pub fn code_digest(code: &str) -> Vec<u8> {
    digest(&SHA256, code.as_bytes()).as_ref().to_vec()
}

/// 摘要的十六进制表示，只用于日志与测试
pub fn code_digest_hex(code: &str) -> String {
    HEXLOWER.encode(&code_digest(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(code_digest("123456"), code_digest("123456"));
        assert_ne!(code_digest("123456"), code_digest("123457"));
        // SHA-256("123456")
        assert_eq!(
            code_digest_hex("123456"),
            "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
    }
}
