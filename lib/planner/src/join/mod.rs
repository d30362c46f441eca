mod interner;
mod order;
mod plan;

pub use interner::SubtreeInterner;
pub use order::{ArbitraryJoinOrder, JoinOrderPlanner};
pub use plan::{EmptyResult, FragmentNode, JoinNode, PlanNode, PlanRef, UnionNode};
