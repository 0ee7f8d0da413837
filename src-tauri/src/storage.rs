//! Secure Storage Module
//!
//! Persisted key/value slots, encrypted with Windows DPAPI where available.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::{info, error, debug};


/// Secure storage rooted at the application data directory
pub struct SecureStorage {
    storage_path: PathBuf,
}

impl SecureStorage {
    /// Create storage under `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let storage_path = root.into();

        if let Err(e) = std::fs::create_dir_all(&storage_path) {
            error!("Failed to create storage directory: {}", e);
        }

        debug!("Secure storage initialized at: {:?}", storage_path);

        Self { storage_path }
    }

    /// Directory backing this storage
    #[cfg(test)]
    pub fn root(&self) -> &std::path::Path {
        &self.storage_path
    }

    fn slot(&self, key: &str) -> PathBuf {
        self.storage_path.join(format!("{}.dat", key))
    }

    /// Save data securely using DPAPI
    pub fn save<T: Serialize>(&self, key: &str, data: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(data)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        
        let encrypted = self.encrypt(json.as_bytes())?;
        
        let file_path = self.slot(key);
        std::fs::write(&file_path, encrypted)
            .map_err(|e| StorageError::Io(e.to_string()))?;
        
        info!("Saved encrypted data for key: {}", key);
        Ok(())
    }

    /// Load data securely using DPAPI
    pub fn load<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<T, StorageError> {
        let file_path = self.slot(key);
        
        let encrypted = std::fs::read(&file_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::Io(e.to_string()),
        })?;
        
        let decrypted = self.decrypt(&encrypted)?;
        
        let json = String::from_utf8(decrypted)
            .map_err(|e| StorageError::Decryption(e.to_string()))?;
        
        serde_json::from_str(&json)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Delete stored data
    pub fn delete(&self, key: &str) -> Result<(), StorageError> {
        let file_path = self.slot(key);
        
        if file_path.exists() {
            std::fs::remove_file(&file_path)
                .map_err(|e| StorageError::Io(e.to_string()))?;
            info!("Deleted stored data for key: {}", key);
        }
        
        Ok(())
    }

    /// Check if key exists
    pub fn exists(&self, key: &str) -> bool {
        let file_path = self.slot(key);
        file_path.exists()
    }

    #[cfg(windows)]
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        dpapi::protect(data).ok_or_else(|| StorageError::Encryption("DPAPI encryption failed".into()))
    }

    #[cfg(windows)]
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        dpapi::unprotect(data).ok_or_else(|| StorageError::Decryption("DPAPI decryption failed".into()))
    }

    #[cfg(not(windows))]
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        // Plaintext outside Windows
        Ok(data.to_vec())
    }

    #[cfg(not(windows))]
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        // Plaintext outside Windows
        Ok(data.to_vec())
    }
}

#[cfg(windows)]
mod dpapi {
    use std::ptr::null_mut;

    use windows::Win32::Foundation::{LocalFree, HLOCAL};
    use windows::Win32::Security::Cryptography::{
        CryptProtectData, CryptUnprotectData, CRYPTPROTECT_UI_FORBIDDEN, CRYPT_INTEGER_BLOB,
    };

    pub fn protect(data: &[u8]) -> Option<Vec<u8>> {
        transform(data, |input, output| unsafe {
            CryptProtectData(input, None, None, None, None, CRYPTPROTECT_UI_FORBIDDEN, output)
                .is_ok()
        })
    }

    pub fn unprotect(data: &[u8]) -> Option<Vec<u8>> {
        transform(data, |input, output| unsafe {
            CryptUnprotectData(input, None, None, None, None, CRYPTPROTECT_UI_FORBIDDEN, output)
                .is_ok()
        })
    }

    fn transform<F>(data: &[u8], call: F) -> Option<Vec<u8>>
    where
        F: FnOnce(&CRYPT_INTEGER_BLOB, &mut CRYPT_INTEGER_BLOB) -> bool,
    {
        let input = CRYPT_INTEGER_BLOB {
            cbData: data.len() as u32,
            pbData: data.as_ptr() as *mut u8,
        };
        let mut output = CRYPT_INTEGER_BLOB {
            cbData: 0,
            pbData: null_mut(),
        };

        if !call(&input, &mut output) {
            return None;
        }

        unsafe {
            let bytes = std::slice::from_raw_parts(output.pbData, output.cbData as usize).to_vec();
            // Output buffer is allocated by DPAPI
            LocalFree(HLOCAL(output.pbData as *mut std::ffi::c_void));
            Some(bytes)
        }
    }
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Nothing stored under key: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(String),
    
    #[error("Serialization error: {0}")]
    Serialization(String),
    
    #[error("Encryption error: {0}")]
    Encryption(String),
    
    #[error("Decryption error: {0}")]
    Decryption(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    fn temp_storage() -> SecureStorage {
        let dir = std::env::temp_dir().join(format!(
            "autogest-storage-{}-{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_dir_all(&dir);
        SecureStorage::new(dir)
    }

    #[test]
    fn save_then_load_returns_value() {
        let storage = temp_storage();
        storage.save("token", &"abc".to_string()).unwrap();
        let loaded: String = storage.load("token").unwrap();
        assert_eq!(loaded, "abc");
        assert!(storage.exists("token"));
    }

    #[test]
    fn missing_key_reports_not_found() {
        let storage = temp_storage();
        let err = storage.load::<String>("token").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(ref key) if key == "token"));
    }

    #[test]
    fn delete_is_idempotent() {
        let storage = temp_storage();
        storage.save("token", &1u32).unwrap();
        storage.delete("token").unwrap();
        storage.delete("token").unwrap();
        assert!(!storage.exists("token"));
    }

    #[test]
    fn corrupt_slot_is_a_serialization_error() {
        let storage = temp_storage();
        std::fs::write(storage.root().join("token.dat"), b"not json").unwrap();
        let err = storage.load::<String>("token").unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
