// Copyright 2026 the Elvira Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-wide policy knobs.

/// Configuration applied to a whole scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneConfig {
    /// Cull occluded content: opaque nodes hide what lies below them.
    ///
    /// When false every enabled node is treated as fully visible within its bounds.
    pub calculate_visibility: bool,
    /// Damage handed out for a buffer age is collapsed to its bounding box once it
    /// has more boxes than this.
    pub max_damage_rects: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            calculate_visibility: true,
            max_damage_rects: 20,
        }
    }
}

impl SceneConfig {
    /// Environment variable that turns occlusion culling off when set to `1`.
    pub const DISABLE_VISIBILITY_ENV: &'static str = "ELVIRA_SCENE_DISABLE_VISIBILITY";

    /// Defaults, adjusted by the process environment.
    ///
    /// Setting `ELVIRA_SCENE_DISABLE_VISIBILITY=1` is handy when hunting rendering
    /// bugs that might be hidden by culling.
    #[cfg(feature = "std")]
    pub fn from_env() -> Self {
        let disabled = std::env::var(Self::DISABLE_VISIBILITY_ENV)
            .map(|v| Self::parse_disable_flag(&v))
            .unwrap_or(false);
        if disabled {
            tracing::debug!("occlusion culling disabled from environment");
        }
        Self {
            calculate_visibility: !disabled,
            ..Self::default()
        }
    }

    #[cfg(feature = "std")]
    fn parse_disable_flag(value: &str) -> bool {
        value.trim() == "1"
    }

    /// Builder-style setter for [`SceneConfig::calculate_visibility`].
    pub fn with_calculate_visibility(mut self, enabled: bool) -> Self {
        self.calculate_visibility = enabled;
        self
    }

    /// Builder-style setter for [`SceneConfig::max_damage_rects`].
    pub fn with_max_damage_rects(mut self, max: usize) -> Self {
        self.max_damage_rects = max;
        self
    }
}
