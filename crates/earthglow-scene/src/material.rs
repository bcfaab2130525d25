//! Material descriptions. The renderer maps these onto pipelines.

/// How a draw combines with what is already in the colour target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Opaque replace.
    Normal,
    /// `src * src_alpha + dst`; overlapping draws accumulate.
    Additive,
}

/// Which triangle faces are rasterised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
}

/// Material of a sphere body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Material {
    /// Textured surface with a blue rim glow. `texture` is a file name
    /// resolved against the asset directory.
    Surface { texture: &'static str },
    /// Glow shell: additive, drawn from the inside.
    Atmosphere,
}

impl Material {
    pub fn blend(&self) -> BlendMode {
        match self {
            Material::Surface { .. } => BlendMode::Normal,
            Material::Atmosphere => BlendMode::Additive,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            Material::Surface { .. } => Side::Front,
            Material::Atmosphere => Side::Back,
        }
    }

    pub fn texture(&self) -> Option<&'static str> {
        match self {
            Material::Surface { texture } => Some(texture),
            Material::Atmosphere => None,
        }
    }
}

/// Material of the starfield points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMaterial {
    /// World-space size; on screen it shrinks with distance.
    pub size: f32,
    /// Linear RGB.
    pub color: [f32; 3],
    pub blend: BlendMode,
}

impl Default for PointMaterial {
    fn default() -> Self {
        Self {
            size: 0.0035,
            color: [1.0, 1.0, 1.0],
            blend: BlendMode::Additive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_material_is_opaque_front() {
        let material = Material::Surface {
            texture: "EarthUV.jpg",
        };
        assert_eq!(material.blend(), BlendMode::Normal);
        assert_eq!(material.side(), Side::Front);
        assert_eq!(material.texture(), Some("EarthUV.jpg"));
    }

    #[test]
    fn test_atmosphere_is_additive_back() {
        assert_eq!(Material::Atmosphere.blend(), BlendMode::Additive);
        assert_eq!(Material::Atmosphere.side(), Side::Back);
        assert_eq!(Material::Atmosphere.texture(), None);
    }
}
