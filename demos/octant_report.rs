//! Compare every triangulation method at one subdivision order
//!
//! Usage: cargo run --example octant_report -- [order] [sphere|cylinder]

use octant_sphere::config::parse_order;
use octant_sphere::*;
use std::time::Instant;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let order = match args.next() {
        Some(arg) => parse_order(&arg)?,
        None => 12,
    };
    let adjacency: AdjacencyMode = match args.next() {
        Some(arg) => arg.parse()?,
        None => AdjacencyMode::Sphere,
    };

    println!("=== Octant triangulations, order {} ({} adjacency) ===\n", order, adjacency);

    for method in Method::ALL {
        let config = OctantConfigBuilder::new()
            .order(order)?
            .method(method)
            .adjacency(adjacency)
            .build()?;

        let start = Instant::now();
        let patch = OctantPatch::generate(config)?;
        let elapsed = start.elapsed();
        let mesh = patch.mesh();

        println!("--- {} ({:?}) ---", method, elapsed);
        println!(
            "vertices: {}, triangles: {}, strip triangles: {}",
            mesh.patch.vertex_count(),
            mesh.patch.triangle_count(),
            mesh.adjacent.iter().map(AdjacentPatch::triangle_count).sum::<usize>()
        );
        println!("{}\n", patch.metrics());
    }

    let sphere = mirror_octants(&build_mesh(&Method::Balanced.generate(order), true));
    println!(
        "full balanced sphere: {} vertices, {} triangles",
        sphere.vertex_count(),
        sphere.triangle_count()
    );

    Ok(())
}
