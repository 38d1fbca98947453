use crate::dataset::{Bounds, UNKNOWN_CODE};
use geojson::{Feature, Geometry, JsonValue, Value};

/// Closed ring of (lon, lat) points
pub type Ring = Vec<(f64, f64)>;

/// Exterior ring first, then holes
pub type Polygon = Vec<Ring>;

/// One country's geometry plus the descriptive properties the join needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryFeature {
    pub name: Option<String>,
    pub admin: Option<String>,
    pub wb_a3: Option<String>,
    pub adm0_a3: Option<String>,
    pub iso_a2: Option<String>,
    pub wb_a2: Option<String>,
    pub bbox: Option<Bounds>,
    pub polygons: Vec<Polygon>,
}

/// Property as text; numbers are rendered, empty strings are absent
fn property(feature: &Feature, key: &str) -> Option<String> {
    let text = match feature.property(key)? {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Known code: present and not the sentinel
fn known(code: &Option<String>) -> Option<&str> {
    code.as_deref().filter(|c| *c != UNKNOWN_CODE)
}

impl BoundaryFeature {
    /// Feature with a name and a World Bank code, no geometry
    pub fn named(name: &str, wb_a3: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            wb_a3: Some(wb_a3.to_string()),
            ..Self::default()
        }
    }

    pub fn from_geojson(feature: &Feature) -> Self {
        let mut polygons = Vec::new();
        if let Some(ref geometry) = feature.geometry {
            collect_polygons(geometry, &mut polygons);
        }

        let bbox = feature
            .bbox
            .as_ref()
            .filter(|b| b.len() >= 4)
            .map(|b| {
                // 2D boxes are [w, s, e, n], 3D ones [w, s, zmin, e, n, zmax]
                let half = b.len() / 2;
                Bounds {
                    min_lon: b[0],
                    min_lat: b[1],
                    max_lon: b[half],
                    max_lat: b[half + 1],
                }
            });

        Self {
            name: property(feature, "NAME"),
            admin: property(feature, "ADMIN"),
            wb_a3: property(feature, "WB_A3"),
            adm0_a3: property(feature, "ADM0_A3"),
            iso_a2: property(feature, "ISO_A2"),
            wb_a2: property(feature, "WB_A2"),
            bbox,
            polygons,
        }
    }

    /// World Bank code, or the administrative code when the former is the
    /// `-99` sentinel or absent
    pub fn join_code(&self) -> String {
        known(&self.wb_a3)
            .or(self.adm0_a3.as_deref())
            .or(self.wb_a3.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.admin.clone())
            .unwrap_or_else(|| self.join_code())
    }

    pub fn flag_code(&self) -> Option<String> {
        known(&self.iso_a2)
            .or_else(|| known(&self.wb_a2))
            .map(str::to_string)
    }

    /// Declared bbox, else computed from the geometry, else the world
    pub fn bounds(&self) -> Bounds {
        self.bbox
            .or_else(|| {
                Bounds::from_points(
                    self.polygons
                        .iter()
                        .filter_map(|p| p.first())
                        .flat_map(|ring| ring.iter().copied()),
                )
            })
            .unwrap_or(Bounds::WORLD)
    }
}

fn ring(coords: &[Vec<f64>]) -> Ring {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    match &geometry.value {
        Value::Polygon(rings) => {
            out.push(rings.iter().map(|r| ring(r)).collect());
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.push(rings.iter().map(|r| ring(r)).collect());
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}
