use crate::core::Storage;
use crate::utils::error::Result;
use std::path::Path;

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
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }

    fn location(&self, path: &str) -> String {
        Path::new(&self.base_path).join(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("reports").display().to_string();
        let storage = LocalStorage::new(base);

        tokio_test::block_on(storage.write_file("2025/deals.csv", b"id\n1\n")).unwrap();

        let written = std::fs::read_to_string(temp_dir.path().join("reports/2025/deals.csv")).unwrap();
        assert_eq!(written, "id\n1\n");
        assert!(storage.location("2025/deals.csv").ends_with("deals.csv"));
    }
}
