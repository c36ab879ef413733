// crates/mh_les/tests/smoke_test.rs

//! 快速冒烟测试
//!
//! 按注册中心选择模型并走完一个外迭代：correct、应力、动量项。

use std::sync::Arc;

use glam::DVec3;
use mh_config::{FilterConfig, LesProperties, ModelCoeffs, SharedProperties};
use mh_les::prelude::*;

fn taylor_green(mesh: &Arc<CartesianMesh>, amplitude: f64) -> VolVectorField {
    let t = std::f64::consts::TAU;
    VolVectorField::from_fn(mesh, |p| {
        DVec3::new(
            amplitude * (t * p.x).sin() * (t * p.y).cos(),
            -amplitude * (t * p.x).cos() * (t * p.y).sin(),
            0.0,
        )
    })
}

fn mixed_props() -> LesProperties {
    LesProperties::default()
        .with_model("mixed_smagorinsky")
        .with_coeffs(
            ScaleSimilarity::TYPE_NAME,
            ModelCoeffs::new().with_filter(FilterConfig::box_filter(2.0)),
        )
}

#[test]
fn test_mixed_model_outer_iteration() {
    let mesh = Arc::new(CartesianMesh::periodic_box(8, 1.0).unwrap());
    let transport = Arc::new(Newtonian::new(mesh.clone(), 1e-4).unwrap());
    let shared = SharedProperties::new(mixed_props());
    let ctx = LesContext::new(mesh.clone(), transport, Arc::new(shared)).unwrap();

    let u0 = taylor_green(&mesh, 1.0);
    let phi = operators::flux(&u0);
    assert!(operators::div_flux(&phi).max_abs() < 1e-12);

    let mut model = LesModelRegistry::default().create(ctx, &u0, &phi).unwrap();
    assert_eq!(model.type_name(), "mixed_smagorinsky");
    assert!(model.is_dissipative());

    let u1 = taylor_green(&mesh, 0.9);
    let grad_u1 = operators::grad(&u1);
    model.correct(&u1, &phi, Some(&grad_u1)).unwrap();

    let nu_sgs = model.sgs_viscosity();
    assert!(nu_sgs.values().iter().all(|&nu| nu >= 0.0));
    assert!(nu_sgs.max_abs() > 0.0);
    assert!(model.sgs_kinetic_energy().max_abs() > 0.0);

    let nu_eff = model.effective_viscosity().unwrap();
    for (eff, sgs) in nu_eff.values().iter().zip(nu_sgs.values()) {
        assert!((eff - sgs - 1e-4).abs() < 1e-14);
    }

    let term = model.effective_stress_divergence(&u1, None).unwrap();
    assert!(term.has_implicit_part());
    assert!(term.is_symmetric());
    let r = term.evaluate(&u1).unwrap();
    assert!(r.values().iter().all(|v| v.is_finite()));

    let reff = model.effective_stress(&u1).unwrap();
    assert!(reff.values().iter().all(|t| t.trace().abs() < 1e-12));
}

#[test]
fn test_smagorinsky_selection_two_dimensional() {
    let mesh = Arc::new(
        CartesianMesh::new(
            [8, 8, 1],
            [0.125, 0.125, 0.5],
            [AxisBoundary::Periodic, AxisBoundary::Periodic, AxisBoundary::Empty],
        )
        .unwrap(),
    );
    let transport = Arc::new(Newtonian::new(mesh.clone(), 1e-4).unwrap());
    let shared = SharedProperties::new(LesProperties::default().with_model("smagorinsky"));
    let ctx = LesContext::new(mesh.clone(), transport, Arc::new(shared)).unwrap();

    let u = taylor_green(&mesh, 1.0);
    let phi = operators::flux(&u);
    let model = LesModelRegistry::default().create(ctx, &u, &phi).unwrap();
    assert_eq!(model.type_name(), "smagorinsky");

    let smag = Smagorinsky::new(model.context().clone(), &u, &phi).unwrap();
    assert!((smag.delta().value() - 0.125).abs() < 1e-12);
    assert_eq!(model.sgs_viscosity().values(), smag.sgs_viscosity().values());
}

#[test]
fn test_similarity_alone_cannot_be_selected() {
    let mesh = Arc::new(CartesianMesh::periodic_box(4, 1.0).unwrap());
    let transport = Arc::new(Newtonian::new(mesh.clone(), 1e-4).unwrap());
    let shared = SharedProperties::new(LesProperties::default().with_model("scale_similarity"));
    let ctx = LesContext::new(mesh.clone(), transport, Arc::new(shared)).unwrap();
    let u = taylor_green(&mesh, 1.0);
    let phi = operators::flux(&u);

    let err = LesModelRegistry::default().create(ctx, &u, &phi).unwrap_err();
    assert!(err.is_config_error());
    assert!(err.to_string().contains("mixed_smagorinsky"));
}
