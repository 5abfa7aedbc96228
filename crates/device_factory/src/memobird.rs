//! 咕咕机 (Memobird) 开放平台设备
//!
//! 通过 HTTP JSON 接口完成绑定、打印与状态查询：
//! - `setuserbind`: 绑定设备，返回 `showapi_userid`
//! - `printpaper`: 提交打印内容，返回 `printcontentid`
//! - `getprintstatus`: 查询打印状态，返回 `printflag`

use std::sync::Arc;

use chrono::Local;
use contracts::{
    ContractError, DeviceConfig, MemobirdConfig, PrintDevice, PrintJobId, PrintStatus,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::client::DeviceFactory;
use crate::encoding::encode_text_part;
use crate::error::{DeviceError, Result};

/// 接口调用成功的返回码
const API_OK: i64 = 1;

const SET_USER_BIND: &str = "setuserbind";
const PRINT_PAPER: &str = "printpaper";
const GET_PRINT_STATUS: &str = "getprintstatus";

/// 时间戳格式 (本地时间)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 多个设备共享的 HTTP 客户端与凭证
#[derive(Debug)]
struct MemobirdApi {
    http: Client,
    access_key: String,
    api_base: String,
}

impl MemobirdApi {
    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.api_base.trim_end_matches('/'))
    }

    fn timestamp() -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        device_id: &str,
        endpoint: &'static str,
        body: &B,
    ) -> Result<R> {
        let http_err = |message: String| DeviceError::Http {
            device_id: device_id.to_string(),
            endpoint,
            message,
        };

        let response = self
            .http
            .post(self.endpoint(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| http_err(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| http_err(format!("failed to read body: {e}")))?;

        if status != StatusCode::OK {
            return Err(http_err(format!("HTTP {}: {text}", status.as_u16())));
        }

        let envelope: ApiEnvelope = serde_json::from_str(&text).map_err(|e| {
            DeviceError::MalformedResponse {
                device_id: device_id.to_string(),
                endpoint,
                message: format!("{e}: {text}"),
            }
        })?;

        if envelope.showapi_res_code != API_OK {
            return Err(DeviceError::Api {
                device_id: device_id.to_string(),
                endpoint,
                code: envelope.showapi_res_code,
                message: envelope.showapi_res_error,
            });
        }

        serde_json::from_str(&text).map_err(|e| DeviceError::MalformedResponse {
            device_id: device_id.to_string(),
            endpoint,
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    showapi_res_code: i64,
    #[serde(default)]
    showapi_res_error: String,
}

#[derive(Serialize)]
struct BindRequest<'a> {
    ak: &'a str,
    timestamp: String,
    #[serde(rename = "memobirdID")]
    memobird_id: &'a str,
    useridentifying: &'a str,
}

#[derive(Deserialize)]
struct BindResponse {
    #[serde(default)]
    showapi_userid: Value,
}

#[derive(Serialize)]
struct PrintRequest<'a> {
    ak: &'a str,
    timestamp: String,
    printcontent: String,
    #[serde(rename = "memobirdID")]
    memobird_id: &'a str,
    #[serde(rename = "userID")]
    user_id: &'a str,
}

#[derive(Deserialize)]
struct PrintResponse {
    #[serde(default)]
    printcontentid: Value,
}

#[derive(Serialize)]
struct StatusRequest<'a> {
    ak: &'a str,
    timestamp: String,
    printcontentid: &'a str,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    printflag: i32,
}

/// 接口里的 ID 既可能是数字也可能是字符串；0 与空串视为缺失
fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.as_i64() != Some(0) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// 咕咕机设备
#[derive(Debug)]
pub struct MemobirdDevice {
    device_id: String,
    user_identifying: String,
    /// setuserbind 返回的用户 ID，绑定一次后复用
    user_id: OnceCell<String>,
    api: Arc<MemobirdApi>,
}

impl MemobirdDevice {
    /// 设备绑定使用的用户标识
    pub fn user_identifying(&self) -> &str {
        &self.user_identifying
    }

    /// 已绑定的用户 ID (init 之前为 None)
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.get().map(String::as_str)
    }

    async fn bind(&self) -> Result<String> {
        let request = BindRequest {
            ak: &self.api.access_key,
            timestamp: MemobirdApi::timestamp(),
            memobird_id: &self.device_id,
            useridentifying: &self.user_identifying,
        };
        let response: BindResponse = self
            .api
            .post(&self.device_id, SET_USER_BIND, &request)
            .await?;

        let user_id = id_from_value(&response.showapi_userid).ok_or_else(|| {
            DeviceError::MalformedResponse {
                device_id: self.device_id.clone(),
                endpoint: SET_USER_BIND,
                message: "missing showapi_userid".to_string(),
            }
        })?;

        info!(device_id = %self.device_id, user_id = %user_id, "memobird device bound");
        Ok(user_id)
    }
}

impl PrintDevice for MemobirdDevice {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    #[instrument(name = "memobird_init", skip(self), fields(device_id = %self.device_id))]
    async fn init(&self) -> std::result::Result<(), ContractError> {
        self.user_id
            .get_or_try_init(|| self.bind())
            .await
            .map(|_| ())
            .map_err(|e| e.into_init_error(&self.device_id))
    }

    #[instrument(
        name = "memobird_print_text",
        skip(self, text),
        fields(device_id = %self.device_id, chars = text.chars().count())
    )]
    async fn print_text(
        &self,
        text: &str,
    ) -> std::result::Result<Option<PrintJobId>, ContractError> {
        let user_id = self.user_id.get().ok_or_else(|| {
            ContractError::device_request(&self.device_id, "device not initialised")
        })?;

        let request = PrintRequest {
            ak: &self.api.access_key,
            timestamp: MemobirdApi::timestamp(),
            printcontent: encode_text_part(text),
            memobird_id: &self.device_id,
            user_id,
        };
        let response: PrintResponse = self
            .api
            .post(&self.device_id, PRINT_PAPER, &request)
            .await?;

        let job = id_from_value(&response.printcontentid).map(PrintJobId::new);
        debug!(job = ?job, "printpaper answered");
        Ok(job)
    }

    #[instrument(
        name = "memobird_status",
        skip(self, job),
        fields(device_id = %self.device_id, job = %job)
    )]
    async fn status(&self, job: &PrintJobId) -> std::result::Result<PrintStatus, ContractError> {
        let request = StatusRequest {
            ak: &self.api.access_key,
            timestamp: MemobirdApi::timestamp(),
            printcontentid: job.as_str(),
        };
        let response: StatusResponse = self
            .api
            .post(&self.device_id, GET_PRINT_STATUS, &request)
            .await?;
        Ok(PrintStatus(response.printflag))
    }
}

/// 咕咕机设备工厂
///
/// 持有共享的 HTTP 客户端和 access key，每次 `create` 生成一个设备句柄。
#[derive(Debug, Clone)]
pub struct MemobirdFactory {
    api: Arc<MemobirdApi>,
}

impl MemobirdFactory {
    /// 从配置创建工厂
    ///
    /// 凭据在注册设备时才检查，没有 access key 也可以创建工厂。
    ///
    /// # Errors
    /// HTTP 客户端构建失败
    pub fn new(config: &MemobirdConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("memo-relay/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DeviceError::invalid_config("memobird", e.to_string()))?;

        Ok(Self {
            api: Arc::new(MemobirdApi {
                http,
                access_key: config.access_key.clone(),
                api_base: config.api_base.clone(),
            }),
        })
    }
}

impl DeviceFactory for MemobirdFactory {
    type Device = MemobirdDevice;

    fn create(&self, config: &DeviceConfig) -> Result<MemobirdDevice> {
        if self.api.access_key.trim().is_empty() {
            return Err(DeviceError::invalid_config(
                "memobird.access_key",
                "access key cannot be empty",
            ));
        }
        if self.api.api_base.trim().is_empty() {
            return Err(DeviceError::invalid_config(
                "memobird.api_base",
                "api_base cannot be empty",
            ));
        }

        let user_identifying = config
            .user_identifying
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(MemobirdDevice {
            device_id: config.device_id.trim().to_string(),
            user_identifying,
            user_id: OnceCell::new(),
            api: Arc::clone(&self.api),
        })
    }
}
