//! Application route table

use crate::guard::RouteMeta;

/// A navigable page and its access rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub meta: RouteMeta,
}

const PUBLIC: RouteMeta = RouteMeta::public();
const AUTH: RouteMeta = RouteMeta::authenticated();
const GUEST: RouteMeta = RouteMeta::guest();

pub const ROUTES: &[Route] = &[
    Route { path: "/", meta: PUBLIC },
    Route { path: "/login", meta: GUEST },
    Route { path: "/register", meta: GUEST },
    Route { path: "/products", meta: PUBLIC },
    Route { path: "/about", meta: PUBLIC },
    Route { path: "/contact", meta: PUBLIC },
    Route { path: "/cart", meta: AUTH },
    Route { path: "/checkout", meta: AUTH },
    Route { path: "/payment-success", meta: AUTH },
    Route { path: "/profile", meta: AUTH },
    Route { path: "/forgot-password", meta: GUEST },
    Route { path: "/reset-password", meta: PUBLIC },
];

/// Look up a route by path; query strings, fragments and a trailing slash are ignored
pub fn find_route(path: &str) -> Option<&'static Route> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    ROUTES.iter().find(|route| route.path == path)
}

/// Access rules for a path; unknown paths are public
pub fn meta_for(path: &str) -> RouteMeta {
    find_route(path).map_or(PUBLIC, |route| route.meta)
}
