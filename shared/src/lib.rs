use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer member identifier, unique across all trees
pub type MemberId = i64;

/// Gender as recorded on a member. An unset gender is `None` on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

/// Gender as carried into the relationship graph.
///
/// Unlike [`Gender`] this keeps "unspecified" as its own state so a layout
/// engine that needs a binary choice has to make that approximation itself
/// (see [`NodeGender::resolve_for_layout`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeGender {
    Male,
    Female,
    #[default]
    Unspecified,
}

impl NodeGender {
    /// Collapse to a binary gender, using `fallback` for unspecified members
    pub fn resolve_for_layout(self, fallback: Gender) -> Gender {
        match self {
            NodeGender::Male => Gender::Male,
            NodeGender::Female => Gender::Female,
            NodeGender::Unspecified => fallback,
        }
    }
}

impl From<Option<Gender>> for NodeGender {
    fn from(gender: Option<Gender>) -> Self {
        match gender {
            Some(Gender::Male) => NodeGender::Male,
            Some(Gender::Female) => NodeGender::Female,
            None => NodeGender::Unspecified,
        }
    }
}

/// How a new member is linked to an existing one when it is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    /// No link: the member is the root of its tree
    None,
    /// The existing member is the new member's parent
    Parent,
    /// The existing member is the new member's spouse
    Spouse,
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipType::None => write!(f, "none"),
            RelationshipType::Parent => write!(f, "parent"),
            RelationshipType::Spouse => write!(f, "spouse"),
        }
    }
}

// ---------------------------------------------------------------------------
// Member records as served by the record API
// ---------------------------------------------------------------------------

/// Minimal reference to another member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: MemberId,
    pub full_name: String,
}

/// Spouse relationship seen from the member stored as `member1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpouseAsFirst {
    pub divorce_date: Option<NaiveDate>,
    pub family_member2: MemberSummary,
}

/// Spouse relationship seen from the member stored as `member2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpouseAsSecond {
    pub divorce_date: Option<NaiveDate>,
    pub family_member1: MemberSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassingRecordSummary {
    pub date_of_passing: NaiveDate,
    #[serde(default)]
    pub causes_of_death: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementSummary {
    pub title: String,
    pub achievement_date: NaiveDate,
}

/// One member as consumed by the relationship graph.
///
/// Only `parent_id` is persisted for the parent link; `children` is the
/// inverse lookup. Spouse relationships arrive as two independent lists
/// depending on which side of the relationship this member was stored on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: MemberId,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    /// String-encoded integer, advisory only
    pub generation: Option<String>,
    #[serde(default)]
    pub is_adopted: bool,
    #[serde(default)]
    pub is_root_person: bool,
    pub parent_id: Option<MemberId>,
    pub parent: Option<MemberSummary>,
    #[serde(default)]
    pub children: Vec<MemberSummary>,
    #[serde(default)]
    pub spouse1: Vec<SpouseAsFirst>,
    #[serde(default)]
    pub spouse2: Vec<SpouseAsSecond>,
    #[serde(default)]
    pub passing_records: Vec<PassingRecordSummary>,
    #[serde(default)]
    pub achievements: Vec<AchievementSummary>,
}

impl MemberRecord {
    /// Parsed generation, `None` when absent or not an integer
    pub fn generation_number(&self) -> Option<i32> {
        parse_generation(self.generation.as_deref())
    }

    /// Every spouse link of this member regardless of which side stored it,
    /// as `(partner id, divorce date)`
    pub fn spouse_links(&self) -> impl Iterator<Item = (MemberId, Option<NaiveDate>)> + '_ {
        self.spouse1
            .iter()
            .map(|s| (s.family_member2.id, s.divorce_date))
            .chain(self.spouse2.iter().map(|s| (s.family_member1.id, s.divorce_date)))
    }
}

/// Parse a string-encoded generation. Surrounding whitespace is ignored.
pub fn parse_generation(generation: Option<&str>) -> Option<i32> {
    generation.and_then(|g| g.trim().parse::<i32>().ok())
}

// ---------------------------------------------------------------------------
// Relationship graph
// ---------------------------------------------------------------------------

/// Tag on a parent/child edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildKind {
    Blood,
    Adopted,
}

impl ChildKind {
    pub fn from_adopted(is_adopted: bool) -> Self {
        if is_adopted {
            ChildKind::Adopted
        } else {
            ChildKind::Blood
        }
    }
}

/// Tag on a spouse edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpouseStatus {
    Married,
    Divorced,
}

impl SpouseStatus {
    pub fn from_divorce_date(divorce_date: Option<NaiveDate>) -> Self {
        match divorce_date {
            Some(_) => SpouseStatus::Divorced,
            None => SpouseStatus::Married,
        }
    }
}

/// A child of some member, as produced by the spouse merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildRef {
    pub id: MemberId,
    #[serde(rename = "type")]
    pub kind: ChildKind,
}

/// A tagged edge from a graph node to another node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation<K> {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: K,
}

pub type ParentEdge = Relation<ChildKind>;
pub type ChildEdge = Relation<ChildKind>;
pub type SiblingEdge = Relation<ChildKind>;
pub type SpouseEdge = Relation<SpouseStatus>;

/// Normalized per-member node handed to a layout engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub gender: NodeGender,
    pub parents: Vec<ParentEdge>,
    pub children: Vec<ChildEdge>,
    /// Never populated; layout engines infer siblings from shared parents
    pub siblings: Vec<SiblingEdge>,
    pub spouses: Vec<SpouseEdge>,
}

/// Problems found while choosing the layout root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphDiagnostic {
    /// No member is flagged as root and no parentless member qualifies
    NoRootCandidate { fallback: MemberId },
    /// Several unrelated parentless members could be the root
    MultipleRootCandidates { candidates: Vec<MemberId>, chosen: MemberId },
    /// More than one member carries the root flag
    MultipleRootFlags { flagged: Vec<MemberId>, chosen: MemberId },
    /// The flagged root member has a recorded parent
    RootHasParent { root: MemberId, parent: MemberId },
    /// The input listed the same member id more than once
    DuplicateMember { id: MemberId },
}

impl fmt::Display for GraphDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphDiagnostic::NoRootCandidate { fallback } => {
                write!(f, "no root candidate found, falling back to member {}", fallback)
            }
            GraphDiagnostic::MultipleRootCandidates { candidates, chosen } => write!(
                f,
                "{} parentless members could be the root ({:?}), using member {}",
                candidates.len(),
                candidates,
                chosen
            ),
            GraphDiagnostic::MultipleRootFlags { flagged, chosen } => write!(
                f,
                "{} members are flagged as root ({:?}), using member {}",
                flagged.len(),
                flagged,
                chosen
            ),
            GraphDiagnostic::RootHasParent { root, parent } => {
                write!(f, "root member {} has parent {}", root, parent)
            }
            GraphDiagnostic::DuplicateMember { id } => {
                write!(f, "member {} appears more than once", id)
            }
        }
    }
}

/// Relationship graph of one tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyGraph {
    pub nodes: Vec<GraphNode>,
    /// `None` only for an empty tree
    pub root_id: Option<String>,
    pub diagnostics: Vec<GraphDiagnostic>,
}

// ---------------------------------------------------------------------------
// Layout output
// ---------------------------------------------------------------------------

/// Integer grid cell assigned by a layout engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub id: String,
    pub left: i32,
    pub top: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub from: Point,
    pub to: Point,
}

/// A node with both grid and pixel placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: String,
    pub left: i32,
    pub top: i32,
    /// Pixel x of the node box's top-left corner
    pub x: f64,
    /// Pixel y of the node box's top-left corner
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PositionedNode {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn bottom_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height)
    }

    pub fn top_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y)
    }
}

/// Straight line between two spouses with the "add child" marker at its middle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpouseConnector {
    pub first_id: String,
    pub second_id: String,
    pub status: SpouseStatus,
    pub line: LineSegment,
    pub midpoint: Point,
}

/// Bracket from one parent down to each of its visible children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildConnector {
    pub parent_id: String,
    pub child_ids: Vec<String>,
    /// Parent bottom edge down to the mid-line
    pub parent_drop: LineSegment,
    /// Horizontal mid-line from the leftmost to the rightmost child
    pub bar: LineSegment,
    /// Mid-line down to each child's top edge, in `child_ids` order
    pub child_drops: Vec<LineSegment>,
}

/// Which members a tree view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", content = "generation", rename_all = "lowercase")]
pub enum ViewFilter {
    #[default]
    All,
    Generation(i32),
}

/// Everything a rendering surface needs to draw a tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLayout {
    pub root_id: Option<String>,
    pub nodes: Vec<PositionedNode>,
    pub spouse_connectors: Vec<SpouseConnector>,
    pub child_connectors: Vec<ChildConnector>,
    pub diagnostics: Vec<GraphDiagnostic>,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Generation assigned to a tree's root member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationBaseline {
    #[default]
    Zero,
    One,
}

impl GenerationBaseline {
    pub fn value(self) -> i32 {
        match self {
            GenerationBaseline::Zero => 0,
            GenerationBaseline::One => 1,
        }
    }
}

/// Grid-to-pixel conversion constants. The cell size must be at least the
/// rendered node size or neighbouring nodes overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpacing {
    pub column_width: f64,
    pub row_height: f64,
    pub node_width: f64,
    pub node_height: f64,
}

impl LayoutSpacing {
    /// Spacing used by the full tree view
    pub fn tree_view() -> Self {
        Self {
            column_width: 120.0,
            row_height: 150.0,
            node_width: 100.0,
            node_height: 100.0,
        }
    }

    /// Spacing used by the per-generation view
    pub fn generation_view() -> Self {
        Self {
            column_width: 120.0,
            row_height: 180.0,
            node_width: 100.0,
            node_height: 120.0,
        }
    }
}

impl Default for LayoutSpacing {
    fn default() -> Self {
        Self::tree_view()
    }
}

/// Configuration for the family tree backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyTreeConfig {
    pub root_generation_baseline: GenerationBaseline,
    pub min_marriage_age_years: u32,
    /// Spacing for the full tree view
    pub layout: LayoutSpacing,
    /// Spacing for the single-generation view
    pub generation_layout: LayoutSpacing,
    /// Fail instead of returning a best-effort root with diagnostics
    pub strict_root_check: bool,
    pub unspecified_gender_layout: Gender,
    pub max_name_length: usize,
}

impl FamilyTreeConfig {
    /// Spacing matching the view being rendered
    pub fn spacing_for(&self, filter: ViewFilter) -> LayoutSpacing {
        match filter {
            ViewFilter::All => self.layout,
            ViewFilter::Generation(_) => self.generation_layout,
        }
    }
}

impl Default for FamilyTreeConfig {
    fn default() -> Self {
        Self {
            root_generation_baseline: GenerationBaseline::Zero,
            min_marriage_age_years: 7,
            layout: LayoutSpacing::tree_view(),
            generation_layout: LayoutSpacing::generation_view(),
            strict_root_check: false,
            unspecified_gender_layout: Gender::Male,
            max_name_length: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Request for creating a family tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTreeRequest {
    pub name: String,
}

/// Link from a new or edited member to an existing one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipLink {
    pub relationship_type: RelationshipType,
    pub related_member_id: MemberId,
    /// Date the bond was established (adoption/acknowledgment for parents,
    /// marriage for spouses)
    pub relationship_date: Option<NaiveDate>,
}

/// Request for creating a member. A request without a relationship creates
/// the tree's root member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    pub full_name: String,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    pub address: Option<String>,
    #[serde(default)]
    pub is_adopted: bool,
    pub relationship: Option<RelationshipLink>,
}

/// Request for updating a member. `None` leaves a field unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub full_name: Option<String>,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    pub address: Option<String>,
    pub is_adopted: Option<bool>,
    /// Relinks the member and recomputes its generation
    pub relationship: Option<RelationshipLink>,
}

/// Request for linking two existing members as spouses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinkSpousesRequest {
    pub member1_id: MemberId,
    pub member2_id: MemberId,
    pub marriage_date: Option<NaiveDate>,
}

/// Inclusive date range; an open end means "ongoing"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BurialPlaceRequest {
    pub location: String,
    pub range: DateRange,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordPassingRequest {
    pub date_of_passing: NaiveDate,
    #[serde(default)]
    pub causes_of_death: Vec<String>,
    #[serde(default)]
    pub burial_places: Vec<BurialPlaceRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddAchievementRequest {
    pub title: String,
    pub description: Option<String>,
    pub achievement_date: NaiveDate,
}

/// Occupation or place of origin held over a date range
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddDatedEntryRequest {
    pub label: String,
    pub range: DateRange,
}
