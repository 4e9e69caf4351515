//! Flat plane geometry shared by every cell of a map

/// A horizontal plane centered on the origin, lying in the XZ plane
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneMesh {
    pub width: f32,
    pub length: f32,
    pub segments: u32,
    pub vertices: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list, counter-clockwise seen from +Y
    pub indices: Vec<u32>,
}

impl PlaneMesh {
    pub fn new(width: f32, length: f32, segments: u32) -> Self {
        let segments = segments.max(1);
        let side = segments + 1;
        let mut vertices = Vec::with_capacity((side * side) as usize);
        let mut uvs = Vec::with_capacity((side * side) as usize);

        for z in 0..side {
            for x in 0..side {
                let u = x as f32 / segments as f32;
                let v = z as f32 / segments as f32;
                vertices.push([(u - 0.5) * width, 0.0, (v - 0.5) * length]);
                uvs.push([u, v]);
            }
        }

        let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
        for z in 0..segments {
            for x in 0..segments {
                let i = z * side + x;
                indices.extend_from_slice(&[i, i + side, i + 1, i + 1, i + side, i + side + 1]);
            }
        }

        Self {
            width,
            length,
            segments,
            vertices,
            uvs,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_quad() {
        let mesh = PlaneMesh::new(2.0, 4.0, 1);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertices[0], [-1.0, 0.0, -2.0]);
        assert_eq!(mesh.vertices[3], [1.0, 0.0, 2.0]);
        assert_eq!(mesh.uvs[3], [1.0, 1.0]);
    }

    #[test]
    fn test_subdivided_plane() {
        let mesh = PlaneMesh::new(1.0, 1.0, 3);
        assert_eq!(mesh.vertices.len(), 16);
        assert_eq!(mesh.triangle_count(), 18);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_zero_segments_clamped() {
        let mesh = PlaneMesh::new(1.0, 1.0, 0);
        assert_eq!(mesh.segments, 1);
        assert_eq!(mesh.triangle_count(), 2);
    }
}
