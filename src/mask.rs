use geo::{BooleanOps, Coord, MultiPolygon, Rect};

/// Full Web Mercator-displayable world in lon/lat.
pub fn world_bounds() -> Rect<f64> {
    Rect::new(Coord { x: -180.0, y: -90.0 }, Coord { x: 180.0, y: 90.0 })
}

/// `world - outline`.
pub fn build_mask(outline: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    let world = MultiPolygon::new(vec![world_bounds().to_polygon()]);
    world.difference(outline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::RegionSet;
    use crate::regions::fixtures::THREE_REGIONS;
    use geo::{Area, Contains, Point};

    #[test]
    fn mask_covers_world_except_country() {
        let set = RegionSet::from_geojson(THREE_REGIONS).unwrap();
        let mask = build_mask(set.outline());

        let world_area = world_bounds().unsigned_area();
        let expected = world_area - set.outline().unsigned_area();
        assert!((mask.unsigned_area() - expected).abs() < world_area * 1e-6);

        assert!(mask.contains(&Point::new(-100.0, 40.0)));
        assert!(!mask.contains(&Point::new(1.0, 1.0)));
        assert!(!mask.contains(&Point::new(10.05, 10.05)));
    }

    #[test]
    fn empty_outline_masks_everything() {
        let mask = build_mask(&MultiPolygon::new(Vec::new()));
        let world_area = world_bounds().unsigned_area();
        assert!((mask.unsigned_area() - world_area).abs() < world_area * 1e-6);
    }
}
