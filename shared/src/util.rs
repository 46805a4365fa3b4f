/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate the remote-store key for an order.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER, since the
/// hosted store is also read by web tooling):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: low bits of the local order id (unique per device)
///
/// Rendered as a fixed-width hex string so keys sort chronologically.
pub fn remote_order_key(order_id: u64) -> String {
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let id_bits = (order_id & 0xFFF) as i64; // 12 bits
    format!("{:014x}", (ts << 12) | id_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_order_key_is_fixed_width() {
        let key = remote_order_key(1);
        assert_eq!(key.len(), 14);
    }

    #[test]
    fn test_remote_order_key_embeds_order_id() {
        let key = remote_order_key(0xABC);
        let value = u64::from_str_radix(&key, 16).unwrap();
        assert_eq!(value & 0xFFF, 0xABC);
    }

    #[test]
    fn test_remote_order_keys_sort_chronologically() {
        let a = remote_order_key(1);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = remote_order_key(1);
        assert!(a < b);
    }
}
