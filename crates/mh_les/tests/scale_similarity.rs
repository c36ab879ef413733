// crates/mh_les/tests/scale_similarity.rs

//! 尺度相似模型的性质测试
//!
//! 覆盖对称性、常数场、零动能、幂等、系数重载与剪切流场景。

use std::sync::Arc;

use glam::DVec3;
use mh_config::{FilterConfig, LesProperties, ModelCoeffs, SharedProperties};
use mh_les::prelude::*;

// ============================================================
// 辅助
// ============================================================

fn similarity_props(c_b: f64, filter: FilterConfig) -> LesProperties {
    LesProperties::default().with_coeffs(
        ScaleSimilarity::TYPE_NAME,
        ModelCoeffs::new().with_value("c_b", c_b).with_filter(filter),
    )
}

fn context(mesh: &Arc<CartesianMesh>, shared: &SharedProperties) -> LesContext {
    let transport = Arc::new(Newtonian::new(mesh.clone(), 1.5e-5).unwrap());
    LesContext::new(mesh.clone(), transport, Arc::new(shared.clone())).unwrap()
}

fn turbulent_box() -> (Arc<CartesianMesh>, VolVectorField) {
    let mesh = Arc::new(CartesianMesh::periodic_box(8, 1.0).unwrap());
    let t = std::f64::consts::TAU;
    let u = VolVectorField::from_fn(&mesh, |p| {
        DVec3::new(
            (t * p.y).sin() + 0.3 * (2.0 * t * p.z).cos(),
            (t * p.z).sin() * (t * p.x).cos(),
            0.5 * (t * p.x).sin() + 0.1 * p.y,
        )
    });
    (mesh, u)
}

fn channel(nx: usize, ny: usize) -> Arc<CartesianMesh> {
    Arc::new(
        CartesianMesh::new(
            [nx, ny, 1],
            [1.0, 1.0, 1.0],
            [AxisBoundary::Periodic, AxisBoundary::ZeroGradient, AxisBoundary::Empty],
        )
        .unwrap(),
    )
}

fn all_filters() -> Vec<FilterConfig> {
    vec![
        FilterConfig::named("simple"),
        FilterConfig::box_filter(2.0),
        FilterConfig::named("gaussian").with_width(2.0),
        FilterConfig::named("anisotropic").with_widths([2.0, 3.0, 1.0]),
        FilterConfig::named("laplace").with_width_coeff(10.0),
    ]
}

// ============================================================
// 不变量
// ============================================================

#[test]
fn test_stress_is_symmetric_for_every_filter() {
    let (mesh, u) = turbulent_box();
    let phi = operators::flux(&u);
    for filter in all_filters() {
        let shared = SharedProperties::new(similarity_props(1.0, filter.clone()));
        let model = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap();
        let b = model.stress_tensor();
        assert!(b.max_abs() > 0.0, "{}", filter.kind);
        for t in b.values() {
            assert!(t.is_finite());
            let m = t.to_mat3();
            for r in 0..3 {
                for c in 0..3 {
                    assert_eq!(m.col(c)[r], m.col(r)[c]);
                }
            }
        }
    }
}

#[test]
fn test_uniform_velocity_gives_zero_stress() {
    let (mesh, _) = turbulent_box();
    let u = VolVectorField::uniform(&mesh, DVec3::new(1.3, -0.4, 2.2));
    let phi = operators::flux(&u);
    for filter in all_filters() {
        let shared = SharedProperties::new(similarity_props(1.0, filter.clone()));
        let model = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap();
        assert!(model.stress_tensor().max_abs() < 1e-12, "{}", filter.kind);
    }
}

#[test]
fn test_kinetic_energy_and_dissipation_identically_zero() {
    let (mesh, u) = turbulent_box();
    let phi = operators::flux(&u);
    let shared = SharedProperties::new(similarity_props(1.0, FilterConfig::box_filter(2.0)));
    let mut model = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap();

    for step in 0..3 {
        let u_step = u.scaled(1.0 + step as f64);
        model.correct(&u_step, &phi, None).unwrap();
        assert!(model.sgs_kinetic_energy().values().iter().all(|&k| k == 0.0));
        assert!(model.sgs_dissipation().values().iter().all(|&e| e == 0.0));
    }
}

#[test]
fn test_correct_is_idempotent() {
    let (mesh, u) = turbulent_box();
    let phi = operators::flux(&u);
    let shared = SharedProperties::new(similarity_props(1.0, FilterConfig::named("gaussian").with_width(2.0)));
    let mut model = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap();

    model.correct(&u, &phi, None).unwrap();
    let first = model.stress_tensor();
    model.correct(&u, &phi, None).unwrap();
    assert_eq!(first.values(), model.stress_tensor().values());
}

#[test]
fn test_grad_hint_does_not_change_result() {
    let (mesh, u) = turbulent_box();
    let phi = operators::flux(&u);
    let shared = SharedProperties::new(similarity_props(1.0, FilterConfig::box_filter(2.0)));
    let mut model = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap();

    model.correct(&u, &phi, None).unwrap();
    let without = model.stress_tensor();
    let grad_u = operators::grad(&u);
    model.correct(&u, &phi, Some(&grad_u)).unwrap();
    assert_eq!(without.values(), model.stress_tensor().values());
}

#[test]
fn test_zero_gradient_field_has_zero_explicit_part() {
    let mesh = channel(6, 6);
    let u = VolVectorField::uniform(&mesh, DVec3::new(1.0, 0.5, 0.0));
    let phi = operators::flux(&u);
    let shared = SharedProperties::new(similarity_props(1.0, FilterConfig::box_filter(2.0)));
    let model = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap();

    let term = model.effective_stress_divergence(&u, None).unwrap();
    assert!(term.explicit_contribution().max_abs() < 1e-12);
    assert!(term.evaluate(&u).unwrap().max_abs() < 1e-12);

    let rho = VolScalarField::uniform(&mesh, 1000.0);
    let term = model.effective_stress_divergence(&u, Some(&rho)).unwrap();
    assert!(term.explicit_contribution().max_abs() < 1e-9);
}

#[test]
fn test_effective_divergence_splits_laminar_and_similarity() {
    let (mesh, u) = turbulent_box();
    let phi = operators::flux(&u);
    let shared = SharedProperties::new(similarity_props(1.0, FilterConfig::box_filter(2.0)));
    let model = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap();

    let total = model.effective_stress_divergence(&u, None).unwrap();
    let sgs = model.sgs_stress_divergence(&u, None).unwrap();
    let laminar = mh_les::turbulence::viscous_stress_divergence(
        &operators::grad(&u),
        &model.transport().nu(),
        None,
    )
    .unwrap();

    // 隐式系数只来自层流项
    assert_eq!(total.diag(), laminar.diag());
    assert!(!sgs.has_implicit_part());
    for (t, (a, b)) in total
        .explicit_source()
        .iter()
        .zip(laminar.explicit_source().iter().zip(sgs.explicit_source()))
    {
        assert!((*t - (*a + *b)).length() < 1e-14);
    }
}

// ============================================================
// 配置重载
// ============================================================

#[test]
fn test_reload_scales_stress_by_coefficient_ratio() {
    let (mesh, u) = turbulent_box();
    let phi = operators::flux(&u);
    let shared = SharedProperties::new(similarity_props(0.8, FilterConfig::box_filter(2.0)));
    let mut model = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap();
    let before = model.stress_tensor();

    shared.set(similarity_props(2.0, FilterConfig::box_filter(2.0)));
    assert!(model.reload_configuration());
    assert_eq!(model.c_b(), 2.0);
    model.correct(&u, &phi, None).unwrap();

    let ratio = 2.0 / 0.8;
    for (a, b) in before.values().iter().zip(model.stress_tensor().values()) {
        assert!((*a * ratio - *b).max_abs() < 1e-12);
    }

    // 再次重载：无变化
    assert!(!model.reload_configuration());
}

#[test]
fn test_reload_without_configuration_keeps_state() {
    let (mesh, u) = turbulent_box();
    let phi = operators::flux(&u);
    let shared = SharedProperties::empty();
    let mut model = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap();
    let before = model.stress_tensor();

    assert!(!model.reload_configuration());
    assert_eq!(model.c_b(), 1.0);
    assert_eq!(before.values(), model.stress_tensor().values());
}

// ============================================================
// 端到端场景
// ============================================================

#[test]
fn test_unit_velocity_with_box_filter() {
    let mesh = Arc::new(CartesianMesh::periodic_box(6, 6.0).unwrap());
    let u = VolVectorField::uniform(&mesh, DVec3::ONE);
    let phi = operators::flux(&u);
    let shared = SharedProperties::new(similarity_props(1.0, FilterConfig::box_filter(2.0)));
    let model = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap();

    assert_eq!(model.filter().type_name(), "box");
    assert!(model.stress_tensor().max_abs() < 1e-12);
    assert!(model.sgs_kinetic_energy().values().iter().all(|&k| k == 0.0));
}

#[test]
fn test_linear_shear_profile() {
    // U_x = c·y，box 宽度 2，dy = 1：
    // 内部单元 filter(u²) − filter(u)² = c²/2，仅 xx 分量非零
    let mesh = channel(4, 8);
    let shared = SharedProperties::new(similarity_props(1.0, FilterConfig::box_filter(2.0)));

    let stress_for = |c: f64| {
        let u = VolVectorField::from_fn(&mesh, |p| DVec3::new(c * p.y, 0.0, 0.0));
        let phi = operators::flux(&u);
        ScaleSimilarity::new(context(&mesh, &shared), &u, &phi)
            .unwrap()
            .stress_tensor()
    };

    let c = 0.7;
    let b1 = stress_for(c);
    let b2 = stress_for(2.0 * c);
    for cell in 0..mesh.n_cells() {
        let j = mesh.cell_ijk(cell)[1];
        assert_eq!(b1[cell].xy, b1[cell].component(1, 0));
        assert!(b1[cell].xy.abs() < 1e-12);
        assert!(b1[cell].yy.abs() < 1e-12);
        assert!(b1[cell].zz.abs() < 1e-12);
        if j == 0 || j == 7 {
            continue;
        }
        assert!((b1[cell].xx - 0.5 * c * c).abs() < 1e-12);
        assert!((b2[cell].xx - 4.0 * b1[cell].xx).abs() < 1e-12);
    }
}

// ============================================================
// 失败路径
// ============================================================

#[test]
fn test_unknown_filter_is_config_error() {
    let (mesh, u) = turbulent_box();
    let phi = operators::flux(&u);
    let shared = SharedProperties::new(similarity_props(1.0, FilterConfig::named("wavelet")));
    let err = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap_err();
    assert!(err.is_config_error());
    assert!(err.to_string().contains("wavelet"));
}

#[test]
fn test_box_filter_without_width_is_config_error() {
    let (mesh, u) = turbulent_box();
    let phi = operators::flux(&u);
    let shared = SharedProperties::new(similarity_props(1.0, FilterConfig::named("box")));
    let err = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap_err();
    assert!(err.is_config_error());
}

#[test]
fn test_velocity_on_other_mesh_is_rejected() {
    let (mesh, _) = turbulent_box();
    let other = channel(4, 4);
    let u = VolVectorField::uniform(&other, DVec3::X);
    let phi = operators::flux(&u);
    let shared = SharedProperties::empty();
    let err = ScaleSimilarity::new(context(&mesh, &shared), &u, &phi).unwrap_err();
    assert!(!err.is_config_error());
}
