use glam::Vec2;

/// Root geometry and subdivision limit for a [`QuadTree`](crate::QuadTree).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QuadTreeConfig {
    /// Minimum corner of the root region.
    pub origin: Vec2,
    /// Side length of the (square) root region.
    pub size: f32,
    /// Deepest level a node may be created at. `None` derives it from the
    /// f32 resolution of the root region.
    pub max_depth: Option<u8>,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            size: 64.0,
            max_depth: None,
        }
    }
}

impl QuadTreeConfig {
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn resolved_max_depth(&self) -> u8 {
        self.max_depth
            .unwrap_or_else(|| Self::calc_max_depth(self.origin, self.size))
    }

    // Halve until a cell would be smaller than one f32 step at the root's
    // magnitude. Only zero-size boxes ever reach this depth.
    fn calc_max_depth(origin: Vec2, size: f32) -> u8 {
        let resolution = origin.abs().max_element().max(size) * f32::EPSILON;
        let mut depth: u8 = 0;
        let mut size = size;
        while resolution > 0.0 && size / 2.0 >= resolution && depth < u8::MAX {
            size /= 2.0;
            depth += 1;
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_is_64_at_origin() {
        let config = QuadTreeConfig::default();
        assert_eq!(config.origin, Vec2::ZERO);
        assert_eq!(config.size, 64.0);
        assert_eq!(config.resolved_max_depth(), 23);
    }

    #[test]
    fn automatic_depth_follows_f32_resolution() {
        assert_eq!(QuadTreeConfig::default().with_size(1024.0).resolved_max_depth(), 23);
        assert_eq!(QuadTreeConfig::default().with_size(1.0).resolved_max_depth(), 23);
        let far = QuadTreeConfig::default().with_origin(Vec2::new(1000.0, 0.0));
        assert_eq!(far.resolved_max_depth(), 19);
        assert_eq!(QuadTreeConfig::default().with_size(0.0).resolved_max_depth(), 0);
        assert_eq!(QuadTreeConfig::default().with_size(f32::NAN).resolved_max_depth(), 0);
    }

    #[test]
    fn explicit_depth_wins() {
        let config = QuadTreeConfig::default().with_size(1024.0).with_max_depth(3);
        assert_eq!(config.resolved_max_depth(), 3);
    }
}
