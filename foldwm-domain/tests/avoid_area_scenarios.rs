// foldwm-domain/tests/avoid_area_scenarios.rs

use foldwm_core::types::Rect;
use foldwm_domain::avoid_area::{AvoidAreaController, AvoidAreaError};
use foldwm_domain::error::DomainError;
use foldwm_domain::window::{AvoidAreaType, WindowNode, WindowType};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

const EMPTY: Rect = Rect::EMPTY;

fn system_window(id: u32, window_type: WindowType, rect: Rect) -> WindowNode {
    let mut node = WindowNode::new(id, window_type, 0);
    node.layout_rect = rect;
    node
}

#[test]
fn status_bar_and_navigation_bar_reserve_top_and_bottom() {
    let mut controller = AvoidAreaController::new();
    controller
        .add_avoid_area_node(&system_window(10, WindowType::StatusBar, Rect::new(0, 0, 1000, 100)))
        .unwrap();
    controller
        .add_avoid_area_node(&system_window(11, WindowType::NavigationBar, Rect::new(0, 900, 1000, 100)))
        .unwrap();

    assert_eq!(
        controller.get_avoid_area_by_type(AvoidAreaType::System),
        [EMPTY, Rect::new(0, 0, 1000, 100), EMPTY, Rect::new(0, 900, 1000, 100)]
    );
    assert_eq!(controller.get_avoid_area_by_type(AvoidAreaType::Cutout), [EMPTY; 4]);
}

#[test]
fn bars_come_and_go_with_every_change_reported() {
    let reported: Arc<Mutex<Vec<([Rect; 4], AvoidAreaType)>>> = Arc::default();
    let sink = Arc::clone(&reported);
    let mut controller = AvoidAreaController::with_callback(Box::new(move |areas: &[Rect; 4], area_type: AvoidAreaType| {
        sink.lock().unwrap().push((*areas, area_type));
    }));

    let status_bar = system_window(10, WindowType::StatusBar, Rect::new(0, 0, 1000, 100));
    let mut nav_bar = system_window(11, WindowType::NavigationBar, Rect::new(0, 900, 1000, 100));
    let keyboard = system_window(12, WindowType::InputMethodFloat, Rect::new(0, 600, 1000, 400));

    controller.add_avoid_area_node(&status_bar).unwrap();
    controller.add_avoid_area_node(&nav_bar).unwrap();
    controller.add_avoid_area_node(&keyboard).unwrap();

    // The navigation bar moves to the left edge in landscape.
    nav_bar.layout_rect = Rect::new(0, 0, 80, 1000);
    controller.update_avoid_area_node(&nav_bar).unwrap();
    controller.remove_avoid_area_node(&status_bar).unwrap();

    let reported = reported.lock().unwrap();
    let types: Vec<AvoidAreaType> = reported.iter().map(|(_, area_type)| *area_type).collect();
    assert_eq!(
        types,
        vec![
            AvoidAreaType::System,
            AvoidAreaType::System,
            AvoidAreaType::Keyboard,
            AvoidAreaType::System,
            AvoidAreaType::System,
        ]
    );
    assert_eq!(reported[2].0, [EMPTY, EMPTY, EMPTY, Rect::new(0, 600, 1000, 400)]);
    assert_eq!(reported[4].0, [Rect::new(0, 0, 80, 1000), EMPTY, EMPTY, EMPTY]);
}

#[test]
fn unknown_nodes_are_rejected_without_side_effects() {
    let mut controller = AvoidAreaController::new();
    let status_bar = system_window(10, WindowType::StatusBar, Rect::new(0, 0, 1000, 100));
    controller.add_avoid_area_node(&status_bar).unwrap();
    let before = controller.get_avoid_area_by_type(AvoidAreaType::System);

    let stray = system_window(20, WindowType::NavigationBar, Rect::new(0, 900, 1000, 100));
    assert_eq!(controller.update_avoid_area_node(&stray), Err(AvoidAreaError::NotRegistered(20)));
    assert_eq!(controller.remove_avoid_area_node(&stray), Err(AvoidAreaError::NotRegistered(20)));
    assert_eq!(
        controller.add_avoid_area_node(&status_bar),
        Err(AvoidAreaError::AlreadyRegistered(10))
    );
    let app = WindowNode::new(30, WindowType::AppMainWindow, 0);
    assert!(matches!(
        controller.add_avoid_area_node(&app),
        Err(AvoidAreaError::NotAvoidType { window_id: 30, .. })
    ));

    assert_eq!(controller.get_avoid_area_by_type(AvoidAreaType::System), before);
}

#[test]
fn avoid_errors_propagate_as_domain_errors() {
    fn register(controller: &mut AvoidAreaController, node: &WindowNode) -> Result<(), DomainError> {
        controller.add_avoid_area_node(node)?;
        Ok(())
    }

    let mut controller = AvoidAreaController::new();
    let app = WindowNode::new(30, WindowType::AppMainWindow, 0);
    let err = register(&mut controller, &app).unwrap_err();
    assert!(matches!(err, DomainError::AvoidArea(AvoidAreaError::NotAvoidType { .. })));
}
