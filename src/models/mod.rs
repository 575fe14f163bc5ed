//! 点云模型
//!
//! 外部协作者（拖拽、添加点）唯一会修改的组件。

pub mod point_cloud;

pub use point_cloud::PointCloud;
