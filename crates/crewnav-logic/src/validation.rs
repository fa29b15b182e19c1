//! Geometry validation for loaded maps.
//!
//! Pure checks over walkable zones and labeled overlays that return a list of
//! issues. The navmesh builder runs [`validate_zones`] and [`check_labels`]
//! first and refuses to build on any error.

use std::collections::HashSet;

use crate::error::MapError;
use crate::geometry::{self, Point};
use crate::map::{LabeledZone, WalkableZone};

/// Zones thinner than this (area / longest side) are flagged.
const MAX_ASPECT_RATIO: f32 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    TooFewVertices(usize),
    ZeroArea,
    SelfIntersecting,
    DuplicateName,
    CentroidOutside,
    ExtremeAspectRatio,
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub zone: String,
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    fn error(zone: &str, kind: IssueKind, message: String) -> Self {
        Self {
            zone: zone.to_string(),
            kind,
            severity: Severity::Error,
            message,
        }
    }

    fn warning(zone: &str, kind: IssueKind, message: String) -> Self {
        Self {
            zone: zone.to_string(),
            kind,
            severity: Severity::Warning,
            message,
        }
    }

    /// The hard error this issue maps to; warnings map to nothing.
    pub fn to_map_error(&self) -> Option<MapError> {
        if self.severity != Severity::Error {
            return None;
        }
        let zone = self.zone.clone();
        Some(match self.kind {
            IssueKind::TooFewVertices(count) => MapError::TooFewVertices { zone, count },
            IssueKind::ZeroArea => MapError::DegeneratePolygon { zone },
            IssueKind::SelfIntersecting => MapError::SelfIntersecting { zone },
            IssueKind::DuplicateName => MapError::DuplicateZone(zone),
            IssueKind::CentroidOutside | IssueKind::ExtremeAspectRatio => return None,
        })
    }
}

// ── A. Per-zone polygon shape ───────────────────────────────────────────

/// Every zone needs at least a triangle.
pub fn check_vertex_counts(zones: &[WalkableZone]) -> Vec<ValidationIssue> {
    zones
        .iter()
        .enumerate()
        .filter(|(_, z)| z.vertices.len() < 3)
        .map(|(i, z)| {
            let name = z.name_or_index(i);
            ValidationIssue::error(
                &name,
                IssueKind::TooFewVertices(z.vertices.len()),
                format!("Zone '{}' has only {} vertices", name, z.vertices.len()),
            )
        })
        .collect()
}

/// Zero-area polygons (collinear or repeated vertices).
pub fn check_zone_areas(zones: &[WalkableZone]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, z) in zones.iter().enumerate() {
        if z.vertices.len() < 3 {
            continue; // caught by vertex count check
        }
        let area = geometry::polygon_area(&z.vertices);
        if area <= f32::EPSILON {
            let name = z.name_or_index(i);
            issues.push(ValidationIssue::error(
                &name,
                IssueKind::ZeroArea,
                format!("Zone '{}' has zero area", name),
            ));
        }
    }
    issues
}

/// Non-adjacent edges must not cross.
pub fn check_self_intersection(zones: &[WalkableZone]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, z) in zones.iter().enumerate() {
        if z.vertices.len() < 4 {
            continue;
        }
        if !geometry::is_simple(&z.vertices) {
            let name = z.name_or_index(i);
            issues.push(ValidationIssue::error(
                &name,
                IssueKind::SelfIntersecting,
                format!("Zone '{}' has crossing edges", name),
            ));
        }
    }
    issues
}

/// Two walkable zones may not share a name.
pub fn check_duplicate_names(zones: &[WalkableZone]) -> Vec<ValidationIssue> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut issues = Vec::new();
    for (i, z) in zones.iter().enumerate() {
        let name = z.name_or_index(i);
        if !seen.insert(name.clone()) {
            issues.push(ValidationIssue::error(
                &name,
                IssueKind::DuplicateName,
                format!("Zone name '{}' appears more than once", name),
            ));
        }
    }
    issues
}

/// A label that carries its own polygon must meet the same shape rules as a
/// walkable zone. Labels without vertices borrow geometry and are skipped.
pub fn check_labels(labels: &[LabeledZone]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for label in labels.iter().filter(|l| !l.vertices.is_empty()) {
        if let Some(issue) = label_shape_issue(&label.name, &label.vertices) {
            issues.push(issue);
        }
    }
    issues
}

/// First shape error in a label polygon, if any.
pub fn label_shape_issue(name: &str, vertices: &[Point]) -> Option<ValidationIssue> {
    if vertices.len() < 3 {
        return Some(ValidationIssue::error(
            name,
            IssueKind::TooFewVertices(vertices.len()),
            format!("Labeled zone '{}' has only {} vertices", name, vertices.len()),
        ));
    }
    if vertices.len() >= 4 && !geometry::is_simple(vertices) {
        return Some(ValidationIssue::error(
            name,
            IssueKind::SelfIntersecting,
            format!("Labeled zone '{}' has crossing edges", name),
        ));
    }
    if geometry::polygon_area(vertices) <= f32::EPSILON {
        return Some(ValidationIssue::error(
            name,
            IssueKind::ZeroArea,
            format!("Labeled zone '{}' has zero area", name),
        ));
    }
    None
}

// ── B. Soft checks (warnings only) ──────────────────────────────────────

/// A stored centroid should sit inside its polygon.
pub fn check_centroids(zones: &[WalkableZone]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, z) in zones.iter().enumerate() {
        if z.vertices.len() < 3 {
            continue;
        }
        if !geometry::polygon_contains(&z.centroid, &z.vertices) {
            let name = z.name_or_index(i);
            issues.push(ValidationIssue::warning(
                &name,
                IssueKind::CentroidOutside,
                format!(
                    "Zone '{}' centroid ({:.1},{:.1}) lies outside its polygon",
                    name, z.centroid.x, z.centroid.y
                ),
            ));
        }
    }
    issues
}

/// Sliver zones are legal but usually an editor slip.
pub fn check_aspect_ratios(zones: &[WalkableZone]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, z) in zones.iter().enumerate() {
        let area = geometry::polygon_area(&z.vertices);
        if area <= f32::EPSILON {
            continue;
        }
        let longest = geometry::edges(&z.vertices)
            .map(|(a, b)| a.distance(&b))
            .fold(0.0f32, f32::max);
        let thickness = area / longest;
        let ratio = longest / thickness;
        if ratio > MAX_ASPECT_RATIO {
            let name = z.name_or_index(i);
            issues.push(ValidationIssue::warning(
                &name,
                IssueKind::ExtremeAspectRatio,
                format!("Zone '{}' has extreme aspect ratio {:.1}:1", name, ratio),
            ));
        }
    }
    issues
}

/// Run all checks; errors first, then warnings.
pub fn validate_zones(zones: &[WalkableZone]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    issues.extend(check_vertex_counts(zones));
    issues.extend(check_zone_areas(zones));
    issues.extend(check_self_intersection(zones));
    issues.extend(check_duplicate_names(zones));
    issues.extend(check_centroids(zones));
    issues.extend(check_aspect_ratios(zones));
    issues
}
