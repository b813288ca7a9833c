//! LogShare Commands

/// 上传的文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

/// 上传日志/文件
#[derive(Debug, Clone)]
pub struct UploadShareLog {
    pub file: Option<UploadedFile>,
    pub admin_password: Option<String>,
    pub client_ip: String,
}
