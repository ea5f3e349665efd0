use crate::config::Config;
use crate::db::Db;
use crate::errors::ApiError;
use std::sync::Arc;
use tokio::sync::OnceCell;
use psi_circuit::constants::SET_CAPACITY;
use psi_circuit::groth16::{deserialize_pk, deserialize_vk, serialize_pk, serialize_vk, setup_keys};

use ark_bn254::Bn254;
use ark_groth16::{ProvingKey, VerifyingKey};
use rand::rngs::OsRng;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<Config>,
    keys: Arc<OnceCell<ZkKeys>>,
}

#[derive(Clone)]
pub struct ZkKeys {
    pub pk: Arc<ProvingKey<Bn254>>,
    pub vk: Arc<VerifyingKey<Bn254>>,
}

impl AppState {
    pub fn new(db: Db, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            keys: Arc::new(OnceCell::new()),
        }
    }

    /// Ensure Groth16 keys exist on disk and in memory.
    ///
    /// This runs the trusted setup (prototype) on first use.
    pub async fn ensure_keys(&self) -> Result<ZkKeys, ApiError> {
        let data_dir = self.config.data_dir.clone();

        self.keys
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || {
                    let keys_dir = data_dir.join("keys");
                    std::fs::create_dir_all(&keys_dir).map_err(|_| ApiError::Internal)?;

                    let pk_path = keys_dir.join(format!("groth16_pk_n{SET_CAPACITY}.bin"));
                    let vk_path = keys_dir.join(format!("groth16_vk_n{SET_CAPACITY}.bin"));

                    if pk_path.exists() && vk_path.exists() {
                        let pk_bytes = std::fs::read(&pk_path).map_err(|_| ApiError::Internal)?;
                        let vk_bytes = std::fs::read(&vk_path).map_err(|_| ApiError::Internal)?;

                        let pk = deserialize_pk(&pk_bytes).map_err(|_| ApiError::Internal)?;
                        let vk = deserialize_vk(&vk_bytes).map_err(|_| ApiError::Internal)?;

                        info!(path = %keys_dir.display(), "loaded groth16 keys");
                        return Ok::<ZkKeys, ApiError>(ZkKeys { pk: Arc::new(pk), vk: Arc::new(vk) });
                    }

                    // Trusted setup randomness (prototype).
                    //
                    // IMPORTANT: In production, use MPC setup or a transparent proof system.
                    let mut rng = OsRng;
                    let (pk, vk) = setup_keys::<SET_CAPACITY>(&mut rng).map_err(|_| ApiError::Internal)?;

                    let pk_bytes = serialize_pk(&pk).map_err(|_| ApiError::Internal)?;
                    let vk_bytes = serialize_vk(&vk).map_err(|_| ApiError::Internal)?;

                    std::fs::write(&pk_path, pk_bytes).map_err(|_| ApiError::Internal)?;
                    std::fs::write(&vk_path, vk_bytes).map_err(|_| ApiError::Internal)?;

                    info!(path = %keys_dir.display(), capacity = SET_CAPACITY, "generated groth16 keys");
                    Ok::<ZkKeys, ApiError>(ZkKeys { pk: Arc::new(pk), vk: Arc::new(vk) })
                })
                .await
                .map_err(|_| ApiError::Internal)?
            })
            .await
            .cloned()
    }
}
