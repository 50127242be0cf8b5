use super::{Album, AlbumCard, ImageRecord};

/// Groups records by folder label, albums in first-seen order.
pub fn group_albums(records: &[ImageRecord], default_label: &str) -> Vec<Album> {
    let mut albums: Vec<Album> = Vec::new();

    for record in records {
        let label = record.album_label(default_label);
        match albums.iter_mut().find(|a| a.name == label) {
            Some(album) => {
                album.images.push(record.clone());
                album.image_count += 1;
            }
            None => albums.push(Album {
                name: label.to_string(),
                images: vec![record.clone()],
                cover_image: record.src.clone(),
                date_added: record.date_added,
                image_count: 1,
            }),
        }
    }

    albums
}

pub fn album_cards(albums: &[Album], select_prefix: &str) -> Vec<AlbumCard> {
    albums
        .iter()
        .map(|album| AlbumCard {
            name: album.name.clone(),
            cover_image: album.cover_image.clone(),
            image_count: album.image_count,
            count_label: format!(
                "{} {}",
                album.image_count,
                if album.image_count == 1 { "image" } else { "images" }
            ),
            date_label: album.date_added.format("%m/%d/%Y").to_string(),
            select_url: format!("{}?name={}", select_prefix, urlencoding::encode(&album.name)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn record(folder: &str, name: &str, offset: i64) -> ImageRecord {
        let base = Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        ImageRecord {
            src: format!("data:image/jpeg;base64,{}", name),
            name: name.to_string(),
            caption: name.to_string(),
            date_added: base + Duration::minutes(offset),
            last_modified: base,
            size: 3,
            folder_name: folder.to_string(),
            path: format!("{}/{}", folder, name),
        }
    }

    #[test]
    fn test_single_folder_makes_one_album() {
        let records = vec![
            record("Trip", "a.jpg", 2),
            record("Trip", "b.png", 1),
            record("Trip", "c.webp", 0),
        ];

        let albums = group_albums(&records, "Untitled Album");
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name, "Trip");
        assert_eq!(albums[0].image_count, 3);
        assert_eq!(albums[0].cover_image, records[0].src);
        assert_eq!(albums[0].date_added, records[0].date_added);
    }

    #[test]
    fn test_missing_label_goes_to_default_album() {
        let records = vec![
            record("Trip", "a.jpg", 0),
            record("", "loose.png", 1),
            record("Home", "h.jpg", 2),
            record("Trip", "b.jpg", 3),
        ];

        let albums = group_albums(&records, "Untitled Album");
        let names: Vec<_> = albums.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Trip", "Untitled Album", "Home"]);
        assert_eq!(albums[0].image_count, 2);
    }

    #[test]
    fn test_cards_pluralise_and_link() {
        let records = vec![record("Summer Trip", "a.jpg", 0)];
        let cards = album_cards(&group_albums(&records, "Untitled Album"), "/albums/select");

        assert_eq!(cards[0].count_label, "1 image");
        assert_eq!(cards[0].date_label, "03/09/2024");
        assert_eq!(cards[0].select_url, "/albums/select?name=Summer%20Trip");
    }
}
