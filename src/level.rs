//! Level catalog and level loading
//!
//! A level is a terrain image, its density map, a short code shown in the
//! HUD and a list of pickups to harvest. Loading builds every body before
//! touching the world, so a failed load leaves the previous level intact.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::AssetSource;
use crate::consts::{PADDLE_POS_X, PADDLE_POS_Y};
use crate::settings::Settings;
use crate::sim::body::{BodyRole, Capabilities, DensityBody};
use crate::sim::raster::Image;
use crate::sim::state::World;

/// Why a level could not be loaded
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read level catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed level catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level {index} does not exist ({count} levels)")]
    OutOfRange { index: u32, count: usize },
    #[error("missing asset {0}")]
    MissingAsset(String),
    #[error("{path}: pixel map is {image:?} but density map is {density:?}")]
    SizeMismatch {
        path: String,
        image: (u32, u32),
        density: (u32, u32),
    },
    #[error("level {0} has no pickups")]
    NoPickups(u32),
}

/// Where a pickup starts and which sprite it uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupPlacement {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "idx")]
    pub variant: u32,
}

/// One entry of the level catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    /// Short code shown next to the level number
    pub code: String,
    /// Terrain pixel map
    pub image: String,
    /// Terrain density map
    pub density: String,
    #[serde(rename = "gems", default)]
    pub pickups: Vec<PickupPlacement>,
}

/// Hands out level data by 1-based index
pub trait LevelSource {
    fn level_count(&self) -> usize;

    fn level(&self, index: u32) -> Result<LevelData, LevelError>;
}

/// Ordered list of levels, stored as a JSON array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelCatalog {
    levels: Vec<LevelData>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<LevelData>) -> Self {
        Self { levels }
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn levels(&self) -> &[LevelData] {
        &self.levels
    }
}

impl LevelSource for LevelCatalog {
    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn level(&self, index: u32) -> Result<LevelData, LevelError> {
        index
            .checked_sub(1)
            .and_then(|i| self.levels.get(i as usize))
            .cloned()
            .ok_or(LevelError::OutOfRange {
                index,
                count: self.levels.len(),
            })
    }
}

/// Every body of a level, built and validated but not yet in the world
struct LevelBodies {
    board: DensityBody,
    ball: DensityBody,
    paddle: DensityBody,
    terrain: DensityBody,
    pickups: Vec<DensityBody>,
}

fn layered_body(
    role: BodyRole,
    image: Image,
    density_path: &str,
    assets: &(impl AssetSource + ?Sized),
) -> Result<DensityBody, LevelError> {
    let density = assets.image(density_path)?;
    DensityBody::with_density_map(role, image, &density).map_err(|e| LevelError::SizeMismatch {
        path: density_path.to_string(),
        image: e.image,
        density: e.density,
    })
}

fn build_level(
    data: &LevelData,
    index: u32,
    assets: &(impl AssetSource + ?Sized),
    settings: &Settings,
) -> Result<LevelBodies, LevelError> {
    if data.pickups.is_empty() {
        return Err(LevelError::NoPickups(index));
    }
    let paths = &settings.assets;

    // Board frame: static, indestructible
    let board = layered_body(
        BodyRole::Wall,
        assets.image(&paths.board_image)?,
        &paths.board_density,
        assets,
    )?;

    let ball = DensityBody::from_image(BodyRole::Ball, assets.image(&paths.ball_image)?);
    let paddle = DensityBody::from_image(BodyRole::Paddle, assets.image(&paths.paddle_image)?)
        .at(Vec2::new(PADDLE_POS_X, PADDLE_POS_Y));

    let terrain = layered_body(BodyRole::Wall, assets.image(&data.image)?, &data.density, assets)?
        .with_caps(Capabilities {
            dynamic: false,
            destructible: true,
        });

    let pickups = data
        .pickups
        .iter()
        .map(|p| {
            let image = assets.image(&paths.pickup_image(p.variant))?;
            let mut pickup = DensityBody::from_image(BodyRole::Pickup, image)
                .at(Vec2::new(p.x as f32, p.y as f32));
            pickup.apply_force(Vec2::new(0.0, settings.gravity));
            Ok(pickup)
        })
        .collect::<Result<Vec<_>, LevelError>>()?;

    Ok(LevelBodies {
        board,
        ball,
        paddle,
        terrain,
        pickups,
    })
}

/// Replace the world's bodies with level `index` (1-based).
///
/// On success the counters are reset for the new level and the ball is
/// glued to the paddle. Lives are left to the caller. On error the world is
/// unchanged.
pub fn load_level(
    world: &mut World,
    index: u32,
    levels: &(impl LevelSource + ?Sized),
    assets: &(impl AssetSource + ?Sized),
    settings: &Settings,
) -> Result<(), LevelError> {
    let data = levels.level(index)?;
    let bodies = build_level(&data, index, assets, settings)?;

    world.clear_bodies();
    world.add_body(bodies.board);
    world.add_body(bodies.ball);
    world.add_body(bodies.paddle);
    world.add_body(bodies.terrain);

    let mut carved = 0;
    for pickup in bodies.pickups {
        let id = world.add_body(pickup);
        // Start each pickup in a pocket rather than inside solid rock
        carved += world.carve_around(id);
    }

    world.required = data.pickups.len() as u32;
    world.collected = 0;
    world.level = index;
    world.level_info = format!("Level {}, code: {}", index, data.code);
    world.ball_glued = true;
    world.stick_ball_to_paddle();

    log::info!(
        "Loaded level {} ({}): {} pickups, {} terrain pixels carved",
        index,
        data.code,
        world.required,
        carved
    );
    Ok(())
}
