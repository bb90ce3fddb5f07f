use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// 本地檔案系統的存儲轉接器。所有路徑都以 `base_path` 為根，
/// 傳入絕對路徑時則直接使用該路徑。
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage
            .write_file("reports/ratings.csv", b"freelancer,total-score")
            .await
            .unwrap();

        let data = storage.read_file("reports/ratings.csv").await.unwrap();
        assert_eq!(data, b"freelancer,total-score");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        assert!(storage.read_file("no-such-file.json").await.is_err());
    }

    #[tokio::test]
    async fn test_absolute_paths_bypass_the_base() {
        let base_dir = TempDir::new().unwrap();
        let other_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(base_dir.path().to_str().unwrap().to_string());

        let absolute = other_dir.path().join("submissions.json");
        std::fs::write(&absolute, b"[]").unwrap();

        let data = storage
            .read_file(absolute.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(data, b"[]");
    }
}
