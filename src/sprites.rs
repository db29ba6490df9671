//! Sprite manager interface
//!
//! The state machine commands sprites by discrete frame index only. The
//! managers own the spritesheet tile numbers for each frame and never make
//! game decisions. An index outside a table is a state machine bug, so the
//! managers panic instead of clamping.

/// Catapult animation frames (index into the catapult tile table)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatapultFrame {
    /// Stopped, arm at 30°, pumpkin in basket
    Load = 0,
    /// Moving, arm at 45°, pumpkin in basket
    Toss1 = 1,
    /// Moving, arm at 60°, pumpkin in basket
    Toss2 = 2,
    /// Stopped, arm at 60°, basket empty
    Toss3 = 3,
}

impl CatapultFrame {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Pumpkin animation frames (index into the pumpkin tile table)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpkinFrame {
    /// Hidden (pumpkin is in the catapult)
    Hide = 0,
    Fly = 1,
    /// Partial splat at 3/4 height
    Splat1 = 2,
    /// Partial splat at 1/2 height
    Splat2 = 3,
    Splat3 = 4,
}

impl PumpkinFrame {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Skeleton animation frames (index into the skeleton tile table)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkeletonFrame {
    /// Below ground
    Hide = 0,
    /// 1 px of skull and sword
    Rise1 = 1,
    Rise2 = 2,
    /// Skull, arms, full sword
    Rise3 = 3,
    Rise4 = 4,
    Rise5 = 5,
    /// Both legs down, sword up
    Stand1 = 6,
    Stand2 = 7,
    Stand3 = 8,
    Stand4 = 9,
}

impl SkeletonFrame {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Commands the state machine sends to the sprite layer
pub trait Sprites {
    /// Select the catapult animation frame
    fn set_primary_sprite(&mut self, frame: usize);
    /// Select the pumpkin frame and place it relative to the catapult (px)
    fn set_projectile_sprite(&mut self, frame: usize, x: f32, y: f32);
    /// Show the charge bar at `level` (0 hides it)
    fn set_charge_indicator(&mut self, level: u8);
}

/// Catapult tiles: (top-left, top-right, bottom-left, bottom-right) of a 16x16 sprite
const CATAPULT_TILES: [[u16; 4]; 4] = [
    [12, 13, 22, 23],
    [14, 15, 24, 25],
    [16, 17, 26, 27],
    [18, 19, 28, 29],
];

/// Pumpkin tiles, one 8x8 tile per frame
const PUMPKIN_TILES: [u16; 5] = [0, 10, 11, 20, 21];

/// Highest charge bar level
pub const CHARGE_LEVELS: u8 = 20;

/// Charge bar: seven 8x8 tiles, rounded ends plus five inner tiles of 4 bars each
const CHARGE_TILES: [[u16; 7]; CHARGE_LEVELS as usize + 1] = [
    [0, 0, 0, 0, 0, 0, 0],
    [1, 3, 2, 2, 2, 2, 7],
    [1, 4, 2, 2, 2, 2, 7],
    [1, 5, 2, 2, 2, 2, 7],
    [1, 6, 2, 2, 2, 2, 7],
    [1, 6, 3, 2, 2, 2, 7],
    [1, 6, 4, 2, 2, 2, 7],
    [1, 6, 5, 2, 2, 2, 7],
    [1, 6, 6, 2, 2, 2, 7],
    [1, 6, 6, 3, 2, 2, 7],
    [1, 6, 6, 4, 2, 2, 7],
    [1, 6, 6, 5, 2, 2, 7],
    [1, 6, 6, 6, 2, 2, 7],
    [1, 6, 6, 6, 3, 2, 7],
    [1, 6, 6, 6, 4, 2, 7],
    [1, 6, 6, 6, 5, 2, 7],
    [1, 6, 6, 6, 6, 2, 7],
    [1, 6, 6, 6, 6, 3, 7],
    [1, 6, 6, 6, 6, 4, 7],
    [1, 6, 6, 6, 6, 5, 7],
    [1, 6, 6, 6, 6, 6, 7],
];

/// Skeleton tiles: (top, bottom) of an 8x16 sprite
const SKELETON_TILES: [[u16; 2]; 10] = [
    [30, 40],
    [31, 41],
    [32, 42],
    [33, 43],
    [34, 44],
    [35, 45],
    [36, 46],
    [37, 47],
    [38, 48],
    [39, 49],
];

/// Size of the skeleton mob
pub const SKELETONS: usize = 3;

/// Tile-grid backed catapult, pumpkin and charge bar sprites.
///
/// Holds the tile numbers and screen positions a display layer would blit.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSprites {
    /// Catapult top-left corner (screen px)
    pub origin: (i32, i32),
    pub catapult: [u16; 4],
    pub pumpkin: u16,
    /// Pumpkin top-left corner (screen px)
    pub pumpkin_pos: (i32, i32),
    pub charge_bar: [u16; 7],
}

impl TileSprites {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            origin: (x, y),
            catapult: CATAPULT_TILES[CatapultFrame::Load.index()],
            pumpkin: PUMPKIN_TILES[PumpkinFrame::Hide.index()],
            pumpkin_pos: (x, y),
            charge_bar: CHARGE_TILES[0],
        }
    }
}

impl Default for TileSprites {
    fn default() -> Self {
        Self::new(0, 25)
    }
}

impl Sprites for TileSprites {
    fn set_primary_sprite(&mut self, frame: usize) {
        match CATAPULT_TILES.get(frame) {
            Some(tiles) => self.catapult = *tiles,
            None => panic!("catapult frame out of range: {frame}"),
        }
    }

    fn set_projectile_sprite(&mut self, frame: usize, x: f32, y: f32) {
        match PUMPKIN_TILES.get(frame) {
            Some(tile) => {
                self.pumpkin = *tile;
                // Float casts saturate; off-screen positions pin at the i32 edge
                self.pumpkin_pos = (
                    self.origin.0.saturating_add(x.round() as i32),
                    self.origin.1.saturating_add(y.round() as i32),
                );
            }
            None => panic!("pumpkin frame out of range: {frame}"),
        }
    }

    fn set_charge_indicator(&mut self, level: u8) {
        match CHARGE_TILES.get(usize::from(level)) {
            Some(tiles) => self.charge_bar = *tiles,
            None => panic!("charge power out of range: {level}"),
        }
    }
}

/// Tile-grid backed skeleton mob, spread evenly across a spawn zone
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonSprites {
    /// Top-left corner of each skeleton (screen px)
    pub positions: [(i32, i32); SKELETONS],
    pub tiles: [[u16; 2]; SKELETONS],
}

impl SkeletonSprites {
    /// Spawn zone from `x0` to `x1` along the row at `y`
    pub fn new(x0: i32, x1: i32, y: i32) -> Self {
        let spacing = (x1 - x0) / SKELETONS as i32;
        let mut sprites = Self {
            positions: std::array::from_fn(|i| (x0 + spacing * i as i32, y)),
            tiles: [SKELETON_TILES[0]; SKELETONS],
        };
        // Initial frames 0, 2, 4
        for n in 0..SKELETONS {
            sprites.set_skeleton(n, n * 2);
        }
        sprites
    }

    /// Set the animation frame of skeleton `n`
    pub fn set_skeleton(&mut self, n: usize, frame: usize) {
        let Some(slot) = self.tiles.get_mut(n) else {
            panic!("skeleton index out of range: {n}");
        };
        match SKELETON_TILES.get(frame) {
            Some(tiles) => *slot = *tiles,
            None => panic!("skeleton frame out of range: {frame}"),
        }
    }
}

impl Default for SkeletonSprites {
    fn default() -> Self {
        Self::new(54, 116, 44)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_frames() {
        let sprites = TileSprites::new(0, 25);
        assert_eq!(sprites.catapult, [12, 13, 22, 23]);
        assert_eq!(sprites.pumpkin, 0);
        assert_eq!(sprites.charge_bar, [0; 7]);
    }

    #[test]
    fn test_projectile_position_is_relative() {
        let mut sprites = TileSprites::new(0, 25);
        sprites.set_projectile_sprite(PumpkinFrame::Fly.index(), 10.4, -3.6);
        assert_eq!(sprites.pumpkin, 10);
        assert_eq!(sprites.pumpkin_pos, (10, 21));
    }

    #[test]
    fn test_far_off_screen_position_pins() {
        let mut sprites = TileSprites::new(0, 25);
        sprites.set_projectile_sprite(PumpkinFrame::Splat3.index(), 1.0e12, f32::MAX);
        assert_eq!(sprites.pumpkin_pos, (i32::MAX, i32::MAX));
        sprites.set_projectile_sprite(PumpkinFrame::Fly.index(), -1.0e12, 0.0);
        assert_eq!(sprites.pumpkin_pos, (i32::MIN, 25));
    }

    #[test]
    fn test_full_charge_bar() {
        let mut sprites = TileSprites::default();
        sprites.set_charge_indicator(CHARGE_LEVELS);
        assert_eq!(sprites.charge_bar, [1, 6, 6, 6, 6, 6, 7]);
    }

    #[test]
    #[should_panic(expected = "catapult frame out of range")]
    fn test_bad_catapult_frame_panics() {
        TileSprites::default().set_primary_sprite(4);
    }

    #[test]
    #[should_panic(expected = "pumpkin frame out of range")]
    fn test_bad_pumpkin_frame_panics() {
        TileSprites::default().set_projectile_sprite(5, 0.0, 0.0);
    }

    #[test]
    #[should_panic(expected = "charge power out of range")]
    fn test_bad_charge_level_panics() {
        TileSprites::default().set_charge_indicator(CHARGE_LEVELS + 1);
    }

    #[test]
    fn test_skeletons_start_staggered() {
        let skeletons = SkeletonSprites::default();
        assert_eq!(skeletons.positions, [(54, 44), (74, 44), (94, 44)]);
        assert_eq!(skeletons.tiles, [[30, 40], [32, 42], [34, 44]]);
    }

    #[test]
    fn test_skeleton_rises_and_stands() {
        let mut skeletons = SkeletonSprites::default();
        skeletons.set_skeleton(2, SkeletonFrame::Stand4.index());
        assert_eq!(skeletons.tiles[2], [39, 49]);
        skeletons.set_skeleton(2, SkeletonFrame::Hide.index());
        assert_eq!(skeletons.tiles[2], [30, 40]);
        assert_eq!(skeletons.tiles[1], [32, 42]);
    }

    #[test]
    #[should_panic(expected = "skeleton index out of range")]
    fn test_bad_skeleton_index_panics() {
        SkeletonSprites::default().set_skeleton(SKELETONS, 0);
    }

    #[test]
    #[should_panic(expected = "skeleton frame out of range")]
    fn test_bad_skeleton_frame_panics() {
        SkeletonSprites::default().set_skeleton(0, SkeletonFrame::Stand4.index() + 1);
    }
}
