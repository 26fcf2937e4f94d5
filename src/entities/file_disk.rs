//! Storage disks used for uploads and backups

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::CompanyId;

/// Disk origin; system disks are created by the installer and keep their credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiskType {
    System,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDisk {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub disk_type: DiskType,
    pub driver: String,
    pub set_as_default: bool,
    pub credentials: Map<String, Value>,
    pub company_id: Option<CompanyId>,
}

impl FileDisk {
    pub fn is_system(&self) -> bool {
        self.disk_type == DiskType::System
    }
}

/// Validated payload of `POST /disks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFileDisk {
    pub name: String,
    pub driver: String,
    #[serde(default)]
    pub credentials: Map<String, Value>,
    #[serde(default)]
    pub set_as_default: bool,
}

impl NewFileDisk {
    pub fn into_disk(self, id: u64, company_id: Option<CompanyId>) -> FileDisk {
        FileDisk {
            id,
            name: self.name,
            disk_type: DiskType::Remote,
            driver: self.driver,
            set_as_default: self.set_as_default,
            credentials: self.credentials,
            company_id,
        }
    }
}

/// Drivers offered to the settings UI, as `(label, value)`
pub const DISK_DRIVERS: &[(&str, &str)] = &[
    ("Local", "local"),
    ("Amazon S3", "s3"),
    ("Digital Ocean Spaces", "doSpaces"),
    ("Dropbox", "dropbox"),
];

/// Credential fields expected by a remote driver, in display order
pub fn credential_fields(driver: &str) -> &'static [&'static str] {
    match driver {
        "s3" => &["key", "secret", "region", "bucket", "root"],
        "doSpaces" => &["key", "secret", "region", "bucket", "endpoint", "root"],
        "dropbox" => &["token", "key", "secret", "app", "root"],
        _ => &[],
    }
}
