use crate::player::{ConfigError, MovementConfig};
use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext};
use thiserror::Error;

#[derive(Default)]
pub struct MovementConfigLoader;

#[derive(Debug, Error)]
pub enum MovementConfigLoaderError {
	#[error("Could not load asset: {0}")]
	Io(#[from] std::io::Error),

	#[error("Could not parse RON: {0}")]
	Ron(#[from] ron::de::SpannedError),

	#[error("Invalid movement config: {0}")]
	Config(#[from] ConfigError),
}

/// Parse and validate a movement config from RON text
pub fn parse_movement_config(bytes: &[u8]) -> Result<MovementConfig, MovementConfigLoaderError> {
	let config = ron::de::from_bytes::<MovementConfig>(bytes)?;
	Ok(config.sanitized()?)
}

impl AssetLoader for MovementConfigLoader {
	type Asset = MovementConfig;
	type Settings = ();
	type Error = MovementConfigLoaderError;

	async fn load(
		&self,
		reader: &mut dyn Reader,
		_settings: &Self::Settings,
		_load_context: &mut LoadContext<'_>,
	) -> Result<Self::Asset, Self::Error> {
		let mut bytes = Vec::new();
		reader.read_to_end(&mut bytes).await?;
		parse_movement_config(&bytes)
	}

	fn extensions(&self) -> &[&str] {
		&["ron"]
	}
}
