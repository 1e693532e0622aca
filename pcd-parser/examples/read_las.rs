use std::path::PathBuf;

use pcd_parser::reader::{las::LasPointReader, PointCloudReader as _};

fn main() {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/sample.laz"));
    let cloud = LasPointReader::new(path).read_cloud().unwrap();

    println!("Number of points: {num_points}", num_points = cloud.len());
    println!("Scale: {:?}", cloud.metadata.scale);
    println!(
        "Coordinate system: {}",
        cloud.metadata.coordinate_system.chars().take(80).collect::<String>()
    );
    if let Some(first) = cloud.iter_scaled().next() {
        println!("First point: {:?}", first);
    };
}
