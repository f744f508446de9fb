/// Current Unix time in milliseconds, the unit every stored timestamp uses.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
