//! Route planning entry point.
//!
//! This module provides:
//! - [`RouteRequest`] - departure, destination, altitude, modes and cost settings
//! - [`RoutePlan`] - legs and total distance of a planned route
//! - [`plan_route`] - runs a [`RouteFinder`] and maps its outcome to a [`Result`]
//! - [`plan_route_with_progress`] - the same with a cancellable progress callback
//!
//! # Example
//!
//! ```ignore
//! use navroute_lib::{plan_route, Modes, Pos, RouteRequest};
//!
//! let mut network = load_network()?;
//! let request = RouteRequest::new(Pos::new(8.57, 50.03), Pos::new(11.78, 48.35))
//!     .with_modes(Modes::AIRWAY)
//!     .with_altitude(24_000);
//! let plan = plan_route(&mut network, &request)?;
//! println!("{} legs, {:.0} NM", plan.legs.len(), plan.distance_nm);
//! ```

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::finder::{FinderConfig, ProgressCallback, RouteFinder, RouteLeg, SearchOutcome};
use crate::geo::{meter_to_nm, Pos};
use crate::network::{DataSource, Modes, RouteNetwork};

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub departure: Pos,
    pub destination: Pos,
    /// Cruise altitude. 0 disables all altitude restrictions.
    pub altitude_ft: i32,
    pub modes: Modes,
    pub config: FinderConfig,
}

impl RouteRequest {
    /// Request using all airways without altitude restriction.
    pub fn new(departure: Pos, destination: Pos) -> Self {
        Self {
            departure,
            destination,
            altitude_ft: 0,
            modes: Modes::AIRWAY,
            config: FinderConfig::default(),
        }
    }

    /// Request using VORs and NDBs on a radio navaid network.
    pub fn radio(departure: Pos, destination: Pos) -> Self {
        Self {
            modes: Modes::RADIO,
            ..Self::new(departure, destination)
        }
    }

    pub fn with_modes(mut self, modes: Modes) -> Self {
        self.modes = modes;
        self
    }

    pub fn with_altitude(mut self, altitude_ft: i32) -> Self {
        self.altitude_ft = altitude_ft;
        self
    }

    pub fn with_config(mut self, config: FinderConfig) -> Self {
        self.config = config;
        self
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub source: DataSource,
    pub legs: Vec<RouteLeg>,
    /// Great-circle length of the route including departure and destination legs.
    pub distance_meter: f32,
    pub distance_nm: f32,
    pub expanded_nodes: usize,
}

impl RoutePlan {
    /// Number of legs between departure and destination.
    pub fn hop_count(&self) -> usize {
        self.legs.len() + 1
    }

    /// Database ids of the route nodes in flight order.
    pub fn nav_ids(&self) -> Vec<i64> {
        self.legs.iter().map(|leg| leg.nav_id).collect()
    }
}

/// Compute a route between the request positions.
pub fn plan_route(network: &mut RouteNetwork, request: &RouteRequest) -> Result<RoutePlan> {
    plan(network, request, None)
}

/// Like [`plan_route`] but reports progress to `progress`, which can cancel the
/// search by returning `false`.
pub fn plan_route_with_progress<'a, F>(
    network: &'a mut RouteNetwork,
    request: &RouteRequest,
    progress: F,
) -> Result<RoutePlan>
where
    F: FnMut(f32, f32) -> bool + 'a,
{
    plan(network, request, Some(Box::new(progress)))
}

fn plan<'a>(
    network: &'a mut RouteNetwork,
    request: &RouteRequest,
    progress: Option<ProgressCallback<'a>>,
) -> Result<RoutePlan> {
    if !network.is_loaded() {
        return Err(Error::NetworkNotLoaded);
    }
    if !request.departure.is_valid() {
        return Err(Error::InvalidPosition { which: "departure" });
    }
    if !request.destination.is_valid() {
        return Err(Error::InvalidPosition {
            which: "destination",
        });
    }

    let source = network.data_source();
    let mut finder = RouteFinder::with_config(network, request.config);
    if let Some(progress) = progress {
        finder.set_progress_callback(progress);
    }
    finder.calculate_route(
        request.departure,
        request.destination,
        request.altitude_ft,
        request.modes,
    );

    match finder.outcome() {
        SearchOutcome::Found => {
            let (legs, distance_meter) = finder.extract_legs();
            debug!(
                legs = legs.len(),
                distance_nm = meter_to_nm(distance_meter),
                "route planned"
            );
            Ok(RoutePlan {
                source,
                legs,
                distance_meter,
                distance_nm: meter_to_nm(distance_meter),
                expanded_nodes: finder.expanded_nodes(),
            })
        }
        SearchOutcome::Aborted => Err(Error::SearchAborted),
        SearchOutcome::NotFound | SearchOutcome::NotSearched => {
            warn!(
                departure = ?request.departure,
                destination = ?request.destination,
                modes = ?request.modes,
                "no route found"
            );
            Err(Error::RouteNotFound)
        }
    }
}
