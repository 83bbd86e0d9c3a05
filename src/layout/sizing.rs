//! Year range, lifecycle classification and node extents.

use crate::model::Entity;
use crate::scale::{TimeScale, YearRange};

use super::types::Lifecycle;

/// Earliest year the timeline will start at.
pub const MIN_YEAR_FLOOR: i32 = 1900;

/// Derive the displayed year range from every year mentioned in the data.
pub fn derive_year_range(entities: &[Entity], current_year: i32) -> YearRange {
    let years = entities.iter().flat_map(|e| {
        std::iter::once(e.founding_year)
            .chain(e.dissolution_year)
            .chain(e.eras.iter().map(|era| era.year))
    });

    let (min, max) = years.fold((i32::MAX, i32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
    let min = if min == i32::MAX { MIN_YEAR_FLOOR } else { min.max(MIN_YEAR_FLOOR) };
    let max = max.max(current_year.saturating_add(1));

    YearRange { min, max }
}

pub fn classify(entity: &Entity, current_year: i32) -> Lifecycle {
    match entity.dissolution_year {
        Some(year) => Lifecycle::Dissolved(year),
        None => {
            let last_seen = entity.last_known_year();
            if last_seen >= current_year.saturating_sub(1) {
                Lifecycle::Active
            } else {
                Lifecycle::Zombie(last_seen)
            }
        }
    }
}

/// Year the entity stops occupying its lane.
pub fn occupancy_end(entity: &Entity, lifecycle: Lifecycle, range: YearRange) -> i32 {
    let end = match lifecycle {
        Lifecycle::Dissolved(year) => year.saturating_add(1),
        Lifecycle::Active => range.max,
        Lifecycle::Zombie(last_seen) => last_seen,
    };
    end.max(entity.founding_year)
}

/// Horizontal extent of a node in pixels: (x, width).
pub fn node_extent(
    entity: &Entity,
    lifecycle: Lifecycle,
    scale: &TimeScale,
    min_active_width: f64,
) -> (f64, f64) {
    let x = scale.x_of(entity.founding_year);
    let width = match lifecycle {
        Lifecycle::Dissolved(year) => scale.x_of(year.saturating_add(1)) - x,
        Lifecycle::Active => (scale.right_edge() - x).max(min_active_width),
        Lifecycle::Zombie(last_seen) => scale.x_of(last_seen) - x,
    };
    (x, width.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range_floor_and_extension() {
        let entities = vec![
            Entity::new("a", 1850, Some(1920)),
            Entity::new("b", 1950, None).with_eras(&[1950, 1999]),
        ];
        let range = derive_year_range(&entities, 2026);

        assert_eq!(range, YearRange { min: 1900, max: 2027 });
    }

    #[test]
    fn test_year_range_empty() {
        let range = derive_year_range(&[], 2026);
        assert_eq!(range, YearRange { min: 1900, max: 2027 });
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(&Entity::new("a", 1990, Some(2000)), 2026),
            Lifecycle::Dissolved(2000)
        );
        assert_eq!(
            classify(&Entity::new("b", 1990, None).with_eras(&[2025]), 2026),
            Lifecycle::Active
        );
        assert_eq!(
            classify(&Entity::new("c", 1990, None).with_eras(&[2010]), 2026),
            Lifecycle::Zombie(2010)
        );
    }

    #[test]
    fn test_node_extents() {
        let range = YearRange { min: 1900, max: 2000 };
        let scale = TimeScale::new(range, 1080.0, 40.0, 1.0);

        let dissolved = Entity::new("a", 1950, Some(1950));
        let (x, w) = node_extent(&dissolved, Lifecycle::Dissolved(1950), &scale, 24.0);
        assert_eq!(x, 540.0);
        assert_eq!(w, 10.0);

        let active = Entity::new("b", 1999, None);
        let (_, w) = node_extent(&active, Lifecycle::Active, &scale, 24.0);
        assert_eq!(w, 24.0);

        let zombie = Entity::new("c", 1950, None);
        let (_, w) = node_extent(&zombie, Lifecycle::Zombie(1950), &scale, 24.0);
        assert_eq!(w, 0.0);
    }

    #[test]
    fn test_occupancy_end() {
        let range = YearRange { min: 1900, max: 2027 };
        let e = Entity::new("a", 1990, Some(2000));
        assert_eq!(occupancy_end(&e, Lifecycle::Dissolved(2000), range), 2001);
        assert_eq!(occupancy_end(&e, Lifecycle::Active, range), 2027);
        assert_eq!(occupancy_end(&e, Lifecycle::Zombie(1995), range), 1995);
    }

    #[test]
    fn test_extreme_years_saturate() {
        let range = derive_year_range(&[Entity::new("a", 1990, Some(i32::MAX))], i32::MAX);
        assert_eq!(range.max, i32::MAX);

        let e = Entity::new("a", 1990, Some(i32::MAX));
        let lifecycle = classify(&e, 2026);
        assert_eq!(occupancy_end(&e, lifecycle, range), i32::MAX);

        let scale = TimeScale::new(YearRange { min: 1900, max: 2000 }, 1080.0, 40.0, 1.0);
        let (_, w) = node_extent(&e, lifecycle, &scale, 24.0);
        assert!(w.is_finite() && w > 0.0);
    }
}
