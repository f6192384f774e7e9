//! Typed store wrapper over a key/value client.

use crate::client::KvClient;
use crate::error::{CacheError, CacheResult};
use bytes::Bytes;
use std::sync::Arc;

/// A typed view of a [`KvClient`], binding key and value codecs.
///
/// `get` returns [`CacheError::NotFound`] on a miss so read-through callers
/// can distinguish absence from transport failure.
pub struct Store<K, V> {
    decode: fn(&[u8]) -> CacheResult<V>,
    encode: fn(&V) -> CacheResult<Vec<u8>>,
    key: fn(&K) -> Vec<u8>,
    client: Arc<dyn KvClient>,
}

impl<K, V> Store<K, V> {
    /// Create a typed store from codecs and a client.
    pub fn new(
        decode: fn(&[u8]) -> CacheResult<V>,
        encode: fn(&V) -> CacheResult<Vec<u8>>,
        key: fn(&K) -> Vec<u8>,
        client: Arc<dyn KvClient>,
    ) -> Self {
        Self {
            decode,
            encode,
            key,
            client,
        }
    }

    /// Get and decode a value.
    pub async fn get(&self, key: &K) -> CacheResult<V> {
        match self.client.get(&(self.key)(key)).await? {
            Some(data) => (self.decode)(&data),
            None => Err(CacheError::NotFound),
        }
    }

    /// Encode and set a value.
    pub async fn set(&self, key: &K, value: &V, expires: bool) -> CacheResult<()> {
        let data = (self.encode)(value)?;
        self.client
            .set(&(self.key)(key), Bytes::from(data), expires)
            .await
    }

    /// Flip an existing entry's expiration.
    pub async fn set_expirable(&self, key: &K, expirable: bool) -> CacheResult<()> {
        self.client.set_expirable(&(self.key)(key), expirable).await
    }
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            decode: self.decode,
            encode: self.encode,
            key: self.key,
            client: self.client.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Mock client with per-operation error injection.
    #[derive(Default)]
    struct MockClient {
        data: Mutex<HashMap<Vec<u8>, (Bytes, bool)>>,
        err_get: Option<String>,
        err_set: Option<String>,
        err_set_expirable: Option<String>,
    }

    #[async_trait]
    impl KvClient for MockClient {
        async fn get(&self, key: &[u8]) -> CacheResult<Option<Bytes>> {
            if let Some(err) = &self.err_get {
                return Err(CacheError::Access(err.clone()));
            }
            Ok(self.data.lock().await.get(key).map(|(v, _)| v.clone()))
        }

        async fn set(&self, key: &[u8], value: Bytes, expires: bool) -> CacheResult<()> {
            if let Some(err) = &self.err_set {
                return Err(CacheError::Access(err.clone()));
            }
            self.data.lock().await.insert(key.to_vec(), (value, expires));
            Ok(())
        }

        async fn set_expirable(&self, key: &[u8], expirable: bool) -> CacheResult<()> {
            if let Some(err) = &self.err_set_expirable {
                return Err(CacheError::Access(err.clone()));
            }
            if let Some(entry) = self.data.lock().await.get_mut(key) {
                entry.1 = expirable;
            }
            Ok(())
        }
    }

    fn string_store(client: Arc<dyn KvClient>) -> Store<String, String> {
        Store::new(
            |data| {
                String::from_utf8(data.to_vec()).map_err(|e| CacheError::Decode(e.to_string()))
            },
            |value| Ok(value.as_bytes().to_vec()),
            |key| key.as_bytes().to_vec(),
            client,
        )
    }

    #[tokio::test]
    async fn normal_behavior() {
        let client = Arc::new(MockClient::default());
        let store = string_store(client.clone());

        store
            .set(&"key1".to_string(), &"value1".to_string(), true)
            .await
            .unwrap();
        store
            .set(&"key2".to_string(), &"value2".to_string(), false)
            .await
            .unwrap();
        store.set_expirable(&"key2".to_string(), true).await.unwrap();

        assert_eq!(store.get(&"key1".to_string()).await.unwrap(), "value1");
        assert_eq!(store.get(&"key2".to_string()).await.unwrap(), "value2");

        let err = store.get(&"key3".to_string()).await.unwrap_err();
        assert!(matches!(err, CacheError::NotFound));

        let data = client.data.lock().await;
        assert!(data.get(b"key1".as_slice()).unwrap().1);
        assert!(data.get(b"key2".as_slice()).unwrap().1);
    }

    #[tokio::test]
    async fn get_errors_propagate() {
        let client = Arc::new(MockClient {
            err_get: Some("something went wrong".to_string()),
            ..MockClient::default()
        });
        let store = string_store(client);

        let err = store.get(&"key1".to_string()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "error accessing cache: something went wrong"
        );
    }

    #[tokio::test]
    async fn set_errors_propagate() {
        let client = Arc::new(MockClient {
            err_set: Some("something went wrong".to_string()),
            ..MockClient::default()
        });
        let store = string_store(client);

        let err = store
            .set(&"key1".to_string(), &"value1".to_string(), true)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "error accessing cache: something went wrong"
        );
    }

    #[tokio::test]
    async fn set_expirable_errors_propagate() {
        let client = Arc::new(MockClient {
            err_set_expirable: Some("something went wrong".to_string()),
            ..MockClient::default()
        });
        let store = string_store(client);

        let err = store
            .set_expirable(&"key1".to_string(), true)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "error accessing cache: something went wrong"
        );
    }
}
