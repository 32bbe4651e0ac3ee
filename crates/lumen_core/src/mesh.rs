//! Triangle soup geometry and the binary STL reader.
//!
//! A binary STL file is an 80 byte header, a little-endian `u32` triangle
//! count and then one 50 byte record per triangle: facet normal, three
//! vertices (all `f32` triples) and a 2 byte attribute field. The stored
//! normal is ignored; shapes recompute it from the vertices.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use lumen_math::{Aabb, Vec3};

use crate::error::{MeshError, MeshResult};

const HEADER_LEN: usize = 80;

/// An unindexed list of triangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleSoup {
    pub triangles: Vec<[Vec3; 3]>,
}

/// How a loaded mesh is placed in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshPlacement {
    /// Where the mesh centre ends up.
    pub position: Vec3,
    /// Uniform scale applied after optional normalization.
    pub scale: f64,
    /// Rescale so the largest bounding box side is 1 before `scale`.
    pub normalize: bool,
}

impl Default for MeshPlacement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 1.0,
            normalize: true,
        }
    }
}

impl TriangleSoup {
    pub fn new(triangles: Vec<[Vec3; 3]>) -> Self {
        Self { triangles }
    }

    /// Get the number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounding box of every vertex.
    pub fn bounds(&self) -> Aabb {
        Aabb::enclosing(self.triangles.iter().flat_map(|tri| tri.iter().copied()))
    }

    /// Largest side of the bounding box, 0 for an empty soup.
    pub fn characteristic_size(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.bounds().max_extent()
        }
    }

    fn map_vertices(&mut self, f: impl Fn(Vec3) -> Vec3) {
        for tri in &mut self.triangles {
            for v in tri.iter_mut() {
                *v = f(*v);
            }
        }
    }

    /// Translate so the bounding box is centred on the origin.
    pub fn recenter(&mut self) {
        if self.is_empty() {
            return;
        }
        let center = self.bounds().centroid();
        self.map_vertices(|v| v - center);
    }

    /// Uniformly rescale so the largest bounding box side is 1.
    pub fn normalize(&mut self) {
        let size = self.characteristic_size();
        if size > 0.0 {
            self.map_vertices(|v| v / size);
        }
    }

    /// Apply a uniform scale followed by a translation.
    pub fn transform(&mut self, scale: f64, translation: Vec3) {
        self.map_vertices(|v| v * scale + translation);
    }

    /// Recenter, optionally normalize, then scale and translate.
    pub fn place(&mut self, placement: &MeshPlacement) {
        self.recenter();
        if placement.normalize {
            self.normalize();
        }
        self.transform(placement.scale, placement.position);
    }
}

fn read_vec3<R: Read>(reader: &mut R) -> std::io::Result<Vec3> {
    let x = reader.read_f32::<LittleEndian>()? as f64;
    let y = reader.read_f32::<LittleEndian>()? as f64;
    let z = reader.read_f32::<LittleEndian>()? as f64;
    // STL files are Z-up; the renderer is Y-up.
    Ok(Vec3::new(x, z, y))
}

fn read_triangle<R: Read>(reader: &mut R) -> std::io::Result<[Vec3; 3]> {
    let _facet_normal = read_vec3(reader)?;
    let v0 = read_vec3(reader)?;
    let v1 = read_vec3(reader)?;
    let v2 = read_vec3(reader)?;
    let _attribute = reader.read_u16::<LittleEndian>()?;
    Ok([v0, v1, v2])
}

/// Parse a binary STL stream.
pub fn read_stl<R: Read>(mut reader: R) -> MeshResult<TriangleSoup> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;
    let count = reader.read_u32::<LittleEndian>()?;

    // Do not trust the declared count for the allocation.
    let mut triangles = Vec::with_capacity((count as usize).min(1 << 20));
    for found in 0..count {
        match read_triangle(&mut reader) {
            Ok(tri) => triangles.push(tri),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(MeshError::Truncated {
                    expected: count,
                    found,
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    log::debug!("Read {} STL triangles", triangles.len());
    Ok(TriangleSoup::new(triangles))
}

fn write_vec3<W: Write>(writer: &mut W, v: Vec3) -> std::io::Result<()> {
    writer.write_f32::<LittleEndian>(v.x as f32)?;
    writer.write_f32::<LittleEndian>(v.z as f32)?;
    writer.write_f32::<LittleEndian>(v.y as f32)
}

/// Write a soup as binary STL, undoing the axis swap done by [`read_stl`].
pub fn write_stl<W: Write>(mut writer: W, soup: &TriangleSoup) -> MeshResult<()> {
    writer.write_all(&[0u8; HEADER_LEN])?;
    writer.write_u32::<LittleEndian>(soup.len() as u32)?;
    for [v0, v1, v2] in &soup.triangles {
        let normal = (*v1 - *v0).cross(*v2 - *v0).normalize_or_zero();
        for v in [normal, *v0, *v1, *v2] {
            write_vec3(&mut writer, v)?;
        }
        writer.write_u16::<LittleEndian>(0)?;
    }
    Ok(())
}

/// Load a binary STL file from disk.
pub fn load_stl<P: AsRef<Path>>(path: P) -> MeshResult<TriangleSoup> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let soup = read_stl(BufReader::new(file))?;
    log::info!("Loaded {} triangles from {}", soup.len(), path.display());
    Ok(soup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Encode triangles (given in file axes) as a binary STL buffer.
    fn encode_stl(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes.write_u32::<LittleEndian>(triangles.len() as u32).unwrap();
        for tri in triangles {
            // Deliberately bogus normal: the reader must ignore it.
            for _ in 0..3 {
                bytes.write_f32::<LittleEndian>(9.0).unwrap();
            }
            for v in tri {
                for c in v {
                    bytes.write_f32::<LittleEndian>(*c).unwrap();
                }
            }
            bytes.write_u16::<LittleEndian>(0).unwrap();
        }
        bytes
    }

    #[test]
    fn test_read_stl_swaps_axes() {
        let bytes = encode_stl(&[[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]]);
        let soup = read_stl(Cursor::new(bytes)).unwrap();

        assert_eq!(soup.len(), 1);
        assert_eq!(soup.triangles[0][0], Vec3::new(1.0, 3.0, 2.0));
        assert_eq!(soup.triangles[0][2], Vec3::new(7.0, 9.0, 8.0));
    }

    #[test]
    fn test_write_then_read_preserves_geometry() {
        let soup = TriangleSoup::new(vec![[
            Vec3::new(0.5, 1.0, -2.0),
            Vec3::new(1.5, 1.0, -2.0),
            Vec3::new(0.5, 3.0, -2.0),
        ]]);
        let mut bytes = Vec::new();
        write_stl(&mut bytes, &soup).unwrap();

        assert_eq!(bytes.len(), HEADER_LEN + 4 + 50);
        assert_eq!(read_stl(Cursor::new(bytes)).unwrap(), soup);
    }

    #[test]
    fn test_read_stl_truncated() {
        let mut bytes = encode_stl(&[
            [[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[0.0; 3], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        ]);
        bytes.truncate(bytes.len() - 10);

        match read_stl(Cursor::new(bytes)) {
            Err(MeshError::Truncated { expected, found }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected truncation error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_stl_short_header() {
        let result = read_stl(Cursor::new(vec![0u8; 40]));
        assert!(matches!(result, Err(MeshError::Io(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_stl("/definitely/not/here.stl");
        assert!(matches!(result, Err(MeshError::Io(_))));
    }

    #[test]
    fn test_place_recenters_and_normalizes() {
        let mut soup = TriangleSoup::new(vec![[
            Vec3::new(10.0, 10.0, 10.0),
            Vec3::new(14.0, 10.0, 10.0),
            Vec3::new(10.0, 12.0, 10.0),
        ]]);
        soup.place(&MeshPlacement {
            position: Vec3::new(0.0, 5.0, 0.0),
            scale: 2.0,
            normalize: true,
        });

        let bounds = soup.bounds();
        assert!((bounds.centroid() - Vec3::new(0.0, 5.0, 0.0)).length() < 1e-12);
        assert!((soup.characteristic_size() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_place_without_normalize_keeps_size() {
        let mut soup = TriangleSoup::new(vec![[Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), Vec3::Y]]);
        soup.place(&MeshPlacement {
            normalize: false,
            ..Default::default()
        });

        assert!((soup.characteristic_size() - 4.0).abs() < 1e-12);
        assert!(soup.bounds().centroid().length() < 1e-12);
    }

    #[test]
    fn test_empty_soup_is_inert() {
        let mut soup = TriangleSoup::default();
        soup.place(&MeshPlacement::default());

        assert!(soup.is_empty());
        assert_eq!(soup.characteristic_size(), 0.0);
    }
}
