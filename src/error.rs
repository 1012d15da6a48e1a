use std::fmt::Display;

pub type AppResult<T> = Result<T, AppErr>;

#[derive(thiserror::Error, Debug)]
pub enum AppErr {
    #[error("Bad request: {0}")]
    Bad(String),

    #[error("Config: {0}")]
    Config(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/* ── 小助手：把任何 error 轉成 Bad ── */
pub fn bad<E: Display>(e: E) -> AppErr { AppErr::Bad(e.to_string()) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_wraps_any_display() {
        let err = bad("empty room name");
        assert!(matches!(err, AppErr::Bad(_)));
        assert_eq!(err.to_string(), "Bad request: empty room name");
    }

    #[test]
    fn json_errors_convert() {
        let err: AppErr = serde_json::from_str::<u8>("x").unwrap_err().into();
        assert!(err.to_string().starts_with("JSON: "));
    }
}
