//! Envelope, pagination and shared field types

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 统一响应信封 `{code, message, data, timestamp}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: i64,
}

/// 信封业务码
pub const CODE_SUCCESS: i64 = 200;
pub const CODE_UNAUTHORIZED: i64 = 401;
pub const CODE_FORBIDDEN: i64 = 403;

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }
}

/// 分页响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    pub total: u64,
    pub size: u64,
    pub current: u64,
    pub pages: u64,
}

impl<T> PageResponse<T> {
    pub fn is_last(&self) -> bool {
        self.current >= self.pages
    }
}

/// 分页参数
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageQuery {
    pub current: u64,
    pub size: u64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { current: 1, size: 10 }
    }
}

/// 启用/禁用状态（后端以 1/0 表示）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "i64", into = "i64")]
pub enum Status {
    Disabled,
    #[default]
    Enabled,
}

impl TryFrom<i64> for Status {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Status::Disabled),
            1 => Ok(Status::Enabled),
            other => Err(format!("invalid status value: {}", other)),
        }
    }
}

impl From<Status> for i64 {
    fn from(status: Status) -> Self {
        match status {
            Status::Disabled => 0,
            Status::Enabled => 1,
        }
    }
}

impl Status {
    pub fn is_enabled(self) -> bool {
        self == Status::Enabled
    }

    pub fn toggled(self) -> Self {
        match self {
            Status::Enabled => Status::Disabled,
            Status::Disabled => Status::Enabled,
        }
    }
}

/// 二进制下载结果（导出表格等）
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// 上传文件
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// 把 `status: 1/0` 映射成 `enabled: bool`
pub(crate) mod status_flag {
    use super::*;

    pub fn serialize<S: Serializer>(enabled: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(if *enabled { 1 } else { 0 })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Ok(value != 0)
    }
}

pub(crate) fn default_true() -> bool {
    true
}

/// 逗号拼接 id 列表，用于批量删除的查询参数
pub(crate) fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_with_null_data() {
        let json = r#"{"code":200,"message":"ok","data":null,"timestamp":1700000000000}"#;
        let resp: ApiResponse<String> = serde_json::from_str(json).unwrap();
        assert!(resp.is_success());
        assert!(resp.data.is_none());
    }

    #[test]
    fn test_envelope_missing_fields_default() {
        let resp: ApiResponse<u32> = serde_json::from_str(r#"{"code":403}"#).unwrap();
        assert_eq!(resp.code, 403);
        assert_eq!(resp.message, "");
        assert_eq!(resp.timestamp, 0);
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_string(&Status::Enabled).unwrap(), "1");
        assert_eq!(serde_json::from_str::<Status>("0").unwrap(), Status::Disabled);
        assert!(serde_json::from_str::<Status>("7").is_err());
        assert_eq!(Status::Enabled.toggled(), Status::Disabled);
    }

    #[test]
    fn test_page_response_is_last() {
        let page: PageResponse<u8> = serde_json::from_str(
            r#"{"records":[1,2],"total":12,"size":10,"current":2,"pages":2}"#,
        )
        .unwrap();
        assert!(page.is_last());
        assert_eq!(page.records, vec![1, 2]);
    }

    #[test]
    fn test_join_ids() {
        assert_eq!(join_ids(&[3, 1, 2]), "3,1,2");
        assert_eq!(join_ids(&[]), "");
    }
}
