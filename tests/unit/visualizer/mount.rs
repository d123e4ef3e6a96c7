use super::*;

#[test]
fn headless_mount_tracks_attach_and_observation() {
    let mount = HeadlessMount::new();
    let mut handle = mount.clone();
    assert!(mount.attached().is_none());

    let surface = SurfaceDescriptor {
        mode: RenderingMode::Vector,
        width: 300,
        height: 200,
    };
    handle.attach(&surface).unwrap();
    handle.observe_resize(true);
    assert_eq!(mount.attached(), Some(surface));
    assert!(mount.is_observing());
    assert_eq!(mount.attach_count(), 1);

    mount.set_size(640, 480);
    assert_eq!(mount.attached().map(|s| (s.width, s.height)), Some((640, 480)));

    handle.observe_resize(false);
    handle.detach();
    assert!(mount.attached().is_none());
    assert!(!mount.is_observing());

    // Sizes reported while detached are dropped.
    mount.set_size(1, 1);
    assert!(mount.attached().is_none());
}
