pub mod analysis;
pub mod avb_class;
pub mod flow;
pub mod link;
pub mod network;
pub mod report;
pub mod shaper;
pub mod theorems;
