use grove_core::{
    model::{PointSet, PrimitiveType, VertexGroup},
    nalgebra::Vector3,
};

/// Builds a small segmented point set exercising every schema feature: colors,
/// normals, several top-level groups, a nested child group and an overlapping
/// membership (point 2 belongs to two groups).
pub fn segmented_test_point_set() -> PointSet {
    let mut point_set = PointSet::from_positions(vec![
        Vector3::new(0.25, -1.5, 3.0),
        Vector3::new(1.0 / 3.0, 0.0, -7.125),
        Vector3::new(2.5, 2.5, 2.5),
        Vector3::new(-3.0, 4.0, 5.0),
        Vector3::new(6.0, -6.0, 6.0),
        Vector3::new(1e-7, 1e7, 0.0),
    ]);
    point_set
        .set_colors(vec![
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.5, 0.5, 0.5),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 1.0),
        ])
        .unwrap();
    point_set
        .set_normals(vec![Vector3::new(0.0, 0.0, 1.0); 6])
        .unwrap();

    let facade = point_set.add_group(VertexGroup::new(
        "facade",
        PrimitiveType::Plane,
        Vector3::new(0.8, 0.1, 0.1),
        vec![0, 1, 2],
    ));
    point_set
        .add_child_group(
            facade,
            VertexGroup::new(
                "window",
                PrimitiveType::Other(11),
                Vector3::new(0.1, 0.1, 0.8),
                vec![1],
            ),
        )
        .unwrap();
    point_set.add_group(VertexGroup::new(
        "ground",
        PrimitiveType::Plane,
        Vector3::new(0.2, 0.6, 0.2),
        vec![2, 3, 4],
    ));
    point_set.add_group(VertexGroup::new(
        "antenna",
        PrimitiveType::Cylinder,
        Vector3::new(0.9, 0.9, 0.9),
        vec![5],
    ));
    point_set
}
