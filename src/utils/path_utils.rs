/// Base name of the folder containing `path`, i.e. the text between the last
/// two separators. `/DCIM/Camera/IMG_1.jpg` gives `Camera`, `/IMG_1.jpg` gives
/// an empty name.
pub fn folder_name(path: &str) -> &str {
    let parent = path.rsplit_once('/').map_or("", |(parent, _)| parent);
    parent.rsplit_once('/').map_or(parent, |(_, name)| name)
}

pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

#[test]
fn test_folder_name() {
    assert_eq!(folder_name("/DCIM/a/IMG1.jpg"), "a");
    assert_eq!(folder_name("/storage/emulated/0/DCIM/Camera/VID_2024.mp4"), "Camera");
    assert_eq!(folder_name("/Pictures/IMG1.jpg"), "Pictures");
    assert_eq!(folder_name("/IMG1.jpg"), "");
    assert_eq!(folder_name("IMG1.jpg"), "");
}

#[test]
fn test_file_name() {
    assert_eq!(file_name("/DCIM/a/IMG1.jpg"), "IMG1.jpg");
    assert_eq!(file_name("IMG1.jpg"), "IMG1.jpg");
    assert_eq!(file_name("/DCIM/a/"), "");
}
