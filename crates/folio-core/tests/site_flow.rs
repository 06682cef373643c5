use std::fs;

use folio_core::catalog::{NewProject, ProjectPatch};
use folio_core::materialize::DeleteRefusal;
use folio_core::site::Site;
use folio_core::{ContentItem, Error, MainContent, ProjectDetail};
use tempfile::TempDir;

const INDEX: &str = "<!DOCTYPE html>\n<html>\n<body>\n    <section class=\"projects\" id=\"projects\">\n    </section>\n    <section class=\"contact\" id=\"contact\">\n      <p>hello</p>\n    </section>\n</body>\n</html>\n";

fn site() -> (TempDir, Site) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), INDEX).unwrap();
    let site = Site::open(dir.path(), "data");
    (dir, site)
}

fn new_project(title: &str) -> NewProject {
    NewProject {
        title: title.into(),
        description: "Short pitch".into(),
        image: "images/card.png".into(),
        ..Default::default()
    }
}

fn index(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("index.html")).unwrap()
}

#[test]
fn create_writes_record_page_and_listing() {
    let (dir, site) = site();
    let project = site.create_project(new_project("Weather Station")).unwrap();

    assert_eq!(project.detail_page, format!("./project-{}.html", project.id));
    let page = fs::read_to_string(dir.path().join(format!("project-{}.html", project.id))).unwrap();
    assert!(page.contains("Weather Station"));
    assert!(page.contains("images/card.png"));

    let listing = index(&dir);
    assert!(listing.contains("<h3 class=\"projects__row-content-title\">Weather Station</h3>"));
    assert!(listing.contains("<p>hello</p>"));

    let detail = site.detail(project.id).unwrap();
    assert_eq!(
        detail.overview,
        vec![ContentItem::Paragraph {
            content: "Short pitch".into()
        }]
    );
}

#[test]
fn regenerate_twice_writes_nothing_the_second_time() {
    let (dir, site) = site();
    let a = site.create_project(new_project("Alpha")).unwrap();
    let b = site.create_project(new_project("Beta")).unwrap();
    fs::remove_file(dir.path().join(format!("project-{}.html", b.id))).unwrap();

    let first = site.regenerate().unwrap();
    assert!(!first.listing_updated);
    assert_eq!(first.pages.written, vec![b.detail_page.clone()]);
    assert_eq!(first.pages.skipped, vec![a.detail_page.clone()]);

    let second = site.regenerate().unwrap();
    assert!(!second.listing_updated);
    assert!(second.pages.written.is_empty());
    assert_eq!(second.pages.skipped.len(), 2);
}

#[test]
fn regenerate_keeps_hand_edited_pages_and_reports_orphans() {
    let (dir, site) = site();
    let project = site.create_project(new_project("Alpha")).unwrap();
    let page = dir.path().join(format!("project-{}.html", project.id));
    fs::write(&page, "hand edited").unwrap();
    fs::write(dir.path().join("project-42.html"), "stale").unwrap();

    let report = site.regenerate().unwrap();
    assert_eq!(fs::read_to_string(&page).unwrap(), "hand edited");
    assert_eq!(report.orphaned, vec!["./project-42.html".to_string()]);
    assert!(dir.path().join("project-42.html").exists());
}

#[test]
fn unsafe_detail_page_is_refused_during_regenerate() {
    let (dir, site) = site();
    let project = site.create_project(new_project("Alpha")).unwrap();
    let mut catalog = site.store().load_catalog().unwrap();
    let mut projects = catalog.projects().to_vec();
    projects[0].detail_page = "../outside.html".into();
    site.store().save_projects(&projects).unwrap();
    catalog = site.store().load_catalog().unwrap();

    let report = site.ensure_detail_pages(&catalog).unwrap();
    assert_eq!(report.refused, vec!["../outside.html".to_string()]);
    assert!(!dir.path().parent().unwrap().join("outside.html").exists());
    assert!(site.detail(project.id).is_ok());
}

#[test]
fn create_with_escaping_page_path_is_rejected_before_any_write() {
    let (_dir, site) = site();
    let mut input = new_project("Alpha");
    input.detail_page = Some("../../etc/passwd".into());
    let err = site.create_project(input).unwrap_err();
    assert!(matches!(err, Error::UnsafePath(_)));
    assert!(site.list_projects().unwrap().is_empty());
}

#[test]
fn delete_removes_generated_page_and_listing_row() {
    let (dir, site) = site();
    let keep = site.create_project(new_project("Keep")).unwrap();
    let gone = site.create_project(new_project("Gone")).unwrap();

    let deleted = site.delete_project(gone.id).unwrap();
    assert!(deleted.page.deleted);
    assert!(!dir.path().join(format!("project-{}.html", gone.id)).exists());
    assert!(!index(&dir).contains("Gone"));
    assert!(index(&dir).contains("Keep"));
    assert!(matches!(site.detail(gone.id), Err(Error::NotFound { .. })));
    assert!(site.detail(keep.id).is_ok());
}

#[test]
fn delete_never_touches_custom_pages() {
    let (dir, site) = site();
    fs::write(dir.path().join("about.html"), "mine").unwrap();
    let mut input = new_project("Custom");
    input.detail_page = Some("about.html".into());
    let project = site.create_project(input).unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("about.html")).unwrap(), "mine");

    let deleted = site.delete_project(project.id).unwrap();
    assert!(!deleted.page.deleted);
    assert_eq!(deleted.page.reason, Some(DeleteRefusal::NotGenerated));
    assert!(dir.path().join("about.html").exists());
}

#[test]
fn saving_detail_refreshes_generated_page() {
    let (dir, site) = site();
    let project = site.create_project(new_project("Alpha")).unwrap();
    let page = dir.path().join(format!("project-{}.html", project.id));

    let mut detail = site.detail(project.id).unwrap();
    detail.skills = vec!["Rust".into(), "SQL".into()];
    detail.main_content = Some(MainContent {
        title: "How it works".into(),
        description: Some("Sensors feed a queue.".into()),
        ..Default::default()
    });
    site.save_detail(detail).unwrap();

    let html = fs::read_to_string(&page).unwrap();
    assert!(html.contains("How it works"));
    assert!(html.contains("<span class=\"skills__skill\">Rust</span>"));
}

#[test]
fn saving_invalid_detail_changes_nothing() {
    let (_dir, site) = site();
    let project = site.create_project(new_project("Alpha")).unwrap();
    let before = site.detail(project.id).unwrap();

    let detail = ProjectDetail {
        project_id: project.id,
        main_content: Some(MainContent {
            description: Some("body without a title".into()),
            ..Default::default()
        }),
        ..Default::default()
    };
    assert!(matches!(site.save_detail(detail), Err(Error::Invalid(_))));
    assert_eq!(site.detail(project.id).unwrap(), before);
}

#[test]
fn reorder_is_reflected_in_listing() {
    let (dir, site) = site();
    let a = site.create_project(new_project("Alpha")).unwrap();
    let b = site.create_project(new_project("Beta")).unwrap();

    let order = site.reorder_projects(&[b.id, 999, a.id]).unwrap();
    assert_eq!(order.iter().map(|p| p.id).collect::<Vec<_>>(), vec![b.id, a.id]);
    let listing = index(&dir);
    assert!(listing.find("Beta").unwrap() < listing.find("Alpha").unwrap());
}

#[test]
fn update_moves_generated_page() {
    let (dir, site) = site();
    let project = site.create_project(new_project("Alpha")).unwrap();
    let old = dir.path().join(format!("project-{}.html", project.id));

    let patch = ProjectPatch {
        title: Some("Alpha Two".into()),
        detail_page: Some("work/alpha.html".into()),
        ..Default::default()
    };
    let updated = site.update_project(project.id, patch).unwrap();
    assert_eq!(updated.detail_page, "work/alpha.html");
    assert!(!old.exists());
    let moved = fs::read_to_string(dir.path().join("work/alpha.html")).unwrap();
    assert!(moved.contains("../css/style.css"));
    assert!(index(&dir).contains("href=\"work/alpha.html\""));
}

#[test]
fn listing_failure_keeps_the_record_change() {
    let (dir, site) = site();
    fs::write(dir.path().join("index.html"), "<html><body>no markers</body></html>").unwrap();

    let err = site.create_project(new_project("Alpha")).unwrap_err();
    assert!(matches!(err, Error::Listing { .. }));
    assert_eq!(err.code(), "document-shape");
    assert_eq!(site.list_projects().unwrap().len(), 1);
    assert_eq!(index(&dir), "<html><body>no markers</body></html>");
}

#[test]
fn summary_update_keeps_hand_edited_page() {
    let (dir, site) = site();
    let project = site.create_project(new_project("Alpha")).unwrap();
    let page = dir.path().join(format!("project-{}.html", project.id));
    fs::write(&page, "hand edited").unwrap();

    let patch = ProjectPatch {
        title: Some("Alpha Prime".into()),
        center_image: Some(true),
        ..Default::default()
    };
    site.update_project(project.id, patch).unwrap();

    assert_eq!(fs::read_to_string(&page).unwrap(), "hand edited");
    assert!(index(&dir).contains("Alpha Prime"));
}

#[test]
fn update_recreates_missing_page() {
    let (dir, site) = site();
    let project = site.create_project(new_project("Alpha")).unwrap();
    let page = dir.path().join(format!("project-{}.html", project.id));
    fs::remove_file(&page).unwrap();

    let patch = ProjectPatch {
        description: Some("New pitch".into()),
        ..Default::default()
    };
    site.update_project(project.id, patch).unwrap();
    assert!(fs::read_to_string(&page).unwrap().contains("Alpha"));
}

#[test]
fn respelling_the_same_page_path_keeps_the_file() {
    let (dir, site) = site();
    let project = site.create_project(new_project("Alpha")).unwrap();
    let page = dir.path().join(format!("project-{}.html", project.id));
    fs::write(&page, "hand edited").unwrap();

    let patch = ProjectPatch {
        detail_page: Some(format!("project-{}.html", project.id)),
        ..Default::default()
    };
    site.update_project(project.id, patch).unwrap();
    assert_eq!(fs::read_to_string(&page).unwrap(), "hand edited");
}

#[test]
fn detail_page_of_another_project_is_rejected() {
    let (dir, site) = site();
    let a = site.create_project(new_project("Alpha")).unwrap();
    let b = site.create_project(new_project("Beta")).unwrap();
    let b_page = dir.path().join(format!("project-{}.html", b.id));
    fs::write(&b_page, "Beta hand edited").unwrap();

    // same file, spelled without the ./ prefix
    let patch = ProjectPatch {
        detail_page: Some(format!("project-{}.html", b.id)),
        ..Default::default()
    };
    let err = site.update_project(a.id, patch).unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));
    assert_eq!(fs::read_to_string(&b_page).unwrap(), "Beta hand edited");
    assert_eq!(site.list_projects().unwrap()[0].detail_page, a.detail_page);

    let mut input = new_project("Gamma");
    input.detail_page = Some(b.detail_page.clone());
    assert!(matches!(site.create_project(input), Err(Error::Invalid(_))));
    assert_eq!(site.list_projects().unwrap().len(), 2);

    site.delete_project(a.id).unwrap();
    assert_eq!(fs::read_to_string(&b_page).unwrap(), "Beta hand edited");
}
