//! End-to-end tests over a synthetic model dataset.
//!
//! A two-year monthly 4-D variable with a known seasonal cycle is built in
//! memory; boxes are extracted and averaged and the results are checked
//! against hand-computed values.

use approx::assert_relative_eq;
use climbox_core::average::{area_weighted_mean_series, spatial_mean, time_mean};
use climbox_core::calendar::{decode_times, Calendar, CalendarDate, TimeUnits};
use climbox_core::extract::extract_box;
use climbox_core::geometry::{GridBox, LonLat};
use climbox_core::levels::box_average_at_level;
use climbox_core::regions;
use climbox_core::seasonal::{seasonal_mean, winter_mean, Season};
use climbox_core::variable::{GriddedVariable, VariableCollection};
use ndarray::{Array, Array1, Array2, Ix3, Ix4};

const NT: usize = 24;
const NLEV: usize = 3;
const NLAT: usize = 4;
const NLON: usize = 8;

/// Annual cycle amplitude per month offset, repeated every year.
fn monthly_anomaly(month: usize) -> f64 {
    (month % 12) as f64
}

fn monthly_dates() -> Vec<CalendarDate> {
    let units = TimeUnits::parse("days since 2000-01-15").unwrap();
    let values: Vec<f64> = (0..NT).map(|i| i as f64 * 365.0 / 12.0).collect();
    decode_times(&values, &units, Calendar::NoLeap).unwrap()
}

fn lats() -> Array1<f64> {
    Array1::from(vec![-15.0, -5.0, 5.0, 15.0])
}

fn lons() -> Array1<f64> {
    Array1::from(vec![80.0, 100.0, 120.0, 140.0, 160.0, 180.0, 200.0, 220.0])
}

/// 4-D variable: value = 200 + 10 * level + month anomaly, flat in space.
fn humidity() -> GriddedVariable {
    let data = Array::from_shape_fn((NT, NLEV, NLAT, NLON), |(t, l, _, _)| {
        200.0 + 10.0 * l as f64 + monthly_anomaly(t)
    })
    .into_dyn();
    GriddedVariable::new(
        "hur",
        "%",
        data,
        monthly_dates(),
        Some(Array1::from(vec![100000.0, 85000.0, 70000.0])),
        lats(),
        lons(),
    )
    .unwrap()
}

/// 3-D surface variable with a latitude gradient: value = 290 + lat / 10.
fn surface_temperature() -> GriddedVariable {
    let lat_values = lats();
    let data = Array::from_shape_fn((NT, NLAT, NLON), |(_, y, _)| 290.0 + lat_values[y] / 10.0)
        .into_dyn();
    GriddedVariable::new("ts", "K", data, monthly_dates(), None, lats(), lons()).unwrap()
}

fn uniform_areas() -> Array2<f64> {
    Array2::from_elem((NLAT, NLON), 1.0e10)
}

mod box_extraction {
    use super::*;

    #[test]
    fn warm_pool_box_is_inclusive_of_matching_grid_points() {
        let var = surface_temperature();
        let sel = extract_box(&var, Some(&regions::warm_pool()), None, None).unwrap();
        // Lons >= 85 start at 100 (index 1); first lon >= 160 is index 4.
        assert_eq!(sel.lon_range.to_range(), 1..5);
        assert_eq!(sel.lon.to_vec(), vec![100.0, 120.0, 140.0, 160.0]);
        // Lats >= -10 start at -5 (index 1); first lat >= 15 is index 3.
        assert_eq!(sel.lat_range.to_range(), 1..4);
        assert_eq!(sel.data.shape(), &[NT, 3, 4]);
    }

    #[test]
    fn date_range_is_start_inclusive_stop_exclusive() {
        let var = surface_temperature();
        let start = CalendarDate::ymd(2000, 5, 1).unwrap();
        let stop = CalendarDate::ymd(2001, 6, 1).unwrap();
        let sel = extract_box(&var, None, Some(start), Some(stop)).unwrap();
        // First sample >= May 1 2000 is the May mid-month step (index 4);
        // first >= Jun 1 2001 is the June 2001 step (index 17), excluded.
        assert_eq!(sel.time_range.to_range(), 4..17);
        assert_eq!(sel.time.len(), 13);
        assert!(sel.time.iter().all(|d| *d >= start && *d < stop));
    }

    #[test]
    fn collection_round_trip_feeds_extraction() {
        let mut dataset = VariableCollection::new();
        dataset.add(surface_temperature());
        dataset.add(humidity());
        let var = dataset.get("hur").unwrap();
        let sel = extract_box(var, Some(&regions::tropics()), None, None).unwrap();
        assert_eq!(sel.level.as_ref().unwrap().len(), NLEV);
        assert_eq!(sel.data.shape()[0], NT);
    }
}

mod weighted_averages {
    use super::*;

    #[test]
    fn constant_in_space_series_recovers_the_cycle() {
        let var = humidity();
        let sel = extract_box(&var, Some(&regions::warm_pool()), None, None).unwrap();
        let areas = uniform_areas();
        let box_areas = areas.slice(ndarray::s![
            sel.lat_range.to_range(),
            sel.lon_range.to_range()
        ]);
        let data = sel.data.view().into_dimensionality::<Ix4>().unwrap();
        // Surface level (index 0): value = 200 + anomaly.
        let surface = data.index_axis(ndarray::Axis(1), 0);
        let series = area_weighted_mean_series(surface, box_areas).unwrap();
        assert_eq!(series.len(), NT);
        for (t, v) in series.iter().enumerate() {
            assert_relative_eq!(*v, 200.0 + monthly_anomaly(t), epsilon = 1e-9);
        }
    }

    #[test]
    fn latitude_gradient_survives_weighting_and_spatial_mean() {
        let var = surface_temperature();
        let sel = extract_box(&var, None, None, None).unwrap();
        let data = sel.data.view().into_dimensionality::<Ix3>().unwrap();
        let series = area_weighted_mean_series(data, uniform_areas().view()).unwrap();
        // Mean of 290 + lat/10 over lats [-15, -5, 5, 15] is 290.
        assert_relative_eq!(series[0], 290.0, epsilon = 1e-9);

        let plain = spatial_mean(data);
        assert_relative_eq!(plain[0], 290.0, epsilon = 1e-9);

        let map = time_mean(data);
        assert_relative_eq!(map[[0, 0]], 288.5, epsilon = 1e-9);
        assert_relative_eq!(map[[3, 0]], 291.5, epsilon = 1e-9);
    }

    #[test]
    fn level_box_average_matches_hand_computation() {
        let var = humidity();
        let areas = uniform_areas();
        let series = box_average_at_level(
            &var,
            areas.view(),
            85000.0,
            5.0,
            Some(&regions::warm_pool()),
            None,
            None,
        )
        .unwrap();
        // Level index 1: value = 210 + anomaly, flat in space.
        for (t, v) in series.iter().enumerate() {
            assert_relative_eq!(*v, 210.0 + monthly_anomaly(t), epsilon = 1e-9);
        }
    }
}

mod climatologies {
    use super::*;

    #[test]
    fn seasonal_profiles_match_hand_computation() {
        let var = humidity();
        let data = var.data().into_dimensionality::<Ix4>().unwrap();
        let profile = seasonal_mean(data, &Season::jja(), None, None).unwrap();
        // JJA anomaly mean = (5 + 6 + 7) / 3 = 6, identical both years.
        assert_eq!(profile.len(), NLEV);
        for (l, v) in profile.iter().enumerate() {
            assert_relative_eq!(*v, 206.0 + 10.0 * l as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn winter_profile_applies_the_year_zero_convention() {
        let var = humidity();
        let data = var.data().into_dimensionality::<Ix4>().unwrap();
        let profile = winter_mean(data, None, None).unwrap();
        // Year 0: mean(Jan, Feb) anomaly = 0.5.
        // Window 1: mean(Dec, Jan, Feb) anomaly = (11 + 0 + 1) / 3 = 4.
        // Divided by 2 years: 2.25.
        for (l, v) in profile.iter().enumerate() {
            assert_relative_eq!(*v, 202.25 + 10.0 * l as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn seasonal_mean_respects_extracted_ranges() {
        let var = humidity();
        let sel = extract_box(&var, Some(&regions::warm_pool()), None, None).unwrap();
        let data = var.data().into_dimensionality::<Ix4>().unwrap();
        let profile =
            seasonal_mean(data, &Season::mam(), Some(sel.lat_range), Some(sel.lon_range)).unwrap();
        // Field is flat in space, so restricting the box changes nothing.
        for (l, v) in profile.iter().enumerate() {
            assert_relative_eq!(*v, 203.0 + 10.0 * l as f64, epsilon = 1e-9);
        }
    }
}
