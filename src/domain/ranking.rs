use std::cmp::Ordering;

use super::geo::GeoCoordinate;

/// Anything that may carry a position on the map.
pub trait Located {
    fn location(&self) -> Option<GeoCoordinate>;
}

/// An item annotated with its distance from the ranking origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub distance_km: Option<f64>,
}

/// Orders `items` by ascending distance from `origin`.
///
/// Without an origin the items come back unannotated in their incoming order.
/// Items without a location sort after every located item. Ties keep input order.
pub fn rank<T: Located>(origin: Option<GeoCoordinate>, items: Vec<T>) -> Vec<Ranked<T>> {
    let Some(origin) = origin else {
        return items
            .into_iter()
            .map(|item| Ranked {
                item,
                distance_km: None,
            })
            .collect();
    };

    let mut ranked: Vec<Ranked<T>> = items
        .into_iter()
        .map(|item| {
            let distance_km = item.location().map(|loc| origin.distance_km(&loc));
            Ranked { item, distance_km }
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| compare_distance(a.distance_km, b.distance_km));
    ranked
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
