//! Fixture networks shared by module and integration tests.

use crate::map::{CityData, GoodData, MapData, RailMap, SegmentData};
use crate::types::Region;

fn city(name: &str, region: Region, lat: f64, lon: f64, goods: &[&str]) -> CityData {
    CityData {
        name: name.to_string(),
        region,
        large: false,
        terminus: false,
        west_coast: false,
        east_coast: false,
        lat,
        lon,
        goods: goods.iter().map(|g| g.to_string()).collect(),
    }
}

fn segment(from: &str, to: &str, cost: u32, rough: bool) -> SegmentData {
    SegmentData {
        from: from.to_string(),
        to: to.to_string(),
        cost,
        rough,
    }
}

fn good(name: &str, regions: &[Region]) -> GoodData {
    GoodData {
        name: name.to_string(),
        regions: regions.to_vec(),
    }
}

/// A small continental network: plains hub around Omaha, a rough mountain
/// crossing, and a coastal terminus on each seaboard.
pub fn fixture_data() -> MapData {
    let mut omaha = city("Omaha", Region::Central, 41.26, -95.93, &["cattle", "grain"]);
    omaha.large = true;
    let mut chicago = city("Chicago", Region::Central, 41.88, -87.63, &["machinery"]);
    chicago.large = true;
    let mut new_york = city("New York", Region::East, 40.71, -74.01, &["imports"]);
    new_york.large = true;
    new_york.terminus = true;
    new_york.east_coast = true;
    let mut seattle = city("Seattle", Region::West, 47.61, -122.33, &["timber"]);
    seattle.west_coast = true;
    let mut san_francisco = city("San Francisco", Region::West, 37.77, -122.42, &["fish"]);
    san_francisco.large = true;
    san_francisco.terminus = true;
    san_francisco.west_coast = true;

    MapData {
        cities: vec![
            omaha,
            city("Kansas City", Region::Central, 39.10, -94.58, &["grain"]),
            city("Minneapolis", Region::Central, 44.98, -93.27, &["timber"]),
            chicago,
            city("St Louis", Region::Central, 38.63, -90.20, &["coal"]),
            city("Pittsburgh", Region::East, 40.44, -80.00, &["steel"]),
            new_york,
            city("Denver", Region::West, 39.74, -104.99, &["ore"]),
            city("Cheyenne", Region::West, 41.14, -104.82, &[]),
            city("Great Falls", Region::West, 47.51, -111.30, &[]),
            seattle,
            san_francisco,
        ],
        segments: vec![
            segment("Omaha", "Denver", 4, false),
            segment("Omaha", "Chicago", 3, false),
            segment("Omaha", "Kansas City", 2, false),
            segment("Omaha", "Minneapolis", 2, false),
            segment("Denver", "Cheyenne", 1, true),
            segment("Cheyenne", "Seattle", 6, true),
            segment("Cheyenne", "Great Falls", 4, false),
            segment("Denver", "San Francisco", 7, true),
            segment("Kansas City", "St Louis", 2, false),
            segment("Chicago", "St Louis", 2, false),
            segment("Chicago", "Pittsburgh", 3, false),
            segment("Pittsburgh", "New York", 2, false),
            segment("Minneapolis", "Seattle", 6, false),
        ],
        goods: vec![
            good("cattle", &[Region::Central]),
            good("grain", &[Region::Central]),
            good("timber", &[Region::West, Region::Central]),
            good("machinery", &[Region::Central]),
            good("coal", &[Region::Central]),
            good("steel", &[Region::East]),
            good("imports", &[Region::East]),
            good("ore", &[Region::West]),
            good("fish", &[Region::West]),
        ],
    }
}

pub fn fixture_map() -> RailMap {
    RailMap::from_data(fixture_data()).expect("fixture dataset is valid")
}

/// A goods-free lattice of `width` x `height` settlements named `C{x}-{y}`,
/// joined to their orthogonal neighbors. Handy for seeding/growth tests that
/// need a larger edge pool than the continental fixture.
pub fn grid_map(width: u16, height: u16) -> RailMap {
    let mut cities = Vec::new();
    let mut segments = Vec::new();
    for x in 0..width {
        for y in 0..height {
            cities.push(city(
                &format!("C{x}-{y}"),
                Region::Central,
                38.0 + f64::from(y),
                -100.0 + f64::from(x),
                &[],
            ));
            if x + 1 < width {
                segments.push(segment(&format!("C{x}-{y}"), &format!("C{}-{y}", x + 1), 1, false));
            }
            if y + 1 < height {
                segments.push(segment(&format!("C{x}-{y}"), &format!("C{x}-{}", y + 1), 1, false));
            }
        }
    }
    RailMap::from_data(MapData {
        cities,
        segments,
        goods: Vec::new(),
    })
    .expect("grid dataset is valid")
}
