use glam::Vec3;

/// Axis-aligned bounding box stored as min/max corners, grounded on the
/// teacher's `core::mesh::Aabb` cache-on-transform idiom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb = aabb.extend(p);
        }
        aabb
    }

    pub fn extend(&self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half the surface area (xy + xz + yz), matching the SAH cost formula
    /// in SPEC_FULL §4.6, which only ever compares this quantity relatively.
    pub fn surface_area(&self) -> f32 {
        let e = self.extent();
        e.x * e.y + e.y * e.z + e.x * e.z
    }

    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    pub fn pad(&self, amount: f32) -> Self {
        let v = Vec3::splat(amount);
        Self {
            min: self.min - v,
            max: self.max + v,
        }
    }
}
