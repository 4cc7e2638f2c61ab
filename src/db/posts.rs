use rusqlite::{params, OptionalExtension, Row};

use crate::db::models::{Post, PostWithAuthor};
use crate::error::AppResult;
use crate::state::DbPool;

pub const POSTS_PER_PAGE: u32 = 3;

/// One page of a post listing, newest first.
#[derive(Debug)]
pub struct Page {
    pub items: Vec<PostWithAuthor>,
    pub number: u32,
    pub total: u32,
}

impl Page {
    pub fn total_pages(&self) -> u32 {
        self.total.div_ceil(POSTS_PER_PAGE).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages()
    }

    pub fn prev_number(&self) -> u32 {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_number(&self) -> u32 {
        (self.number + 1).min(self.total_pages())
    }
}

fn row_to_post(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_post_with_author(row: &Row) -> rusqlite::Result<PostWithAuthor> {
    Ok(PostWithAuthor {
        post: row_to_post(row)?,
        author_username: row.get(6)?,
        author_avatar: row.get(7)?,
    })
}

pub fn create(pool: &DbPool, user_id: &str, title: &str, body: &str) -> AppResult<Post> {
    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO posts (id, user_id, title, body) VALUES (?1, ?2, ?3, ?4)",
        params![id, user_id, title, body],
    )?;
    conn.query_row(
        "SELECT id, user_id, title, body, created_at, updated_at FROM posts WHERE id = ?1",
        params![id],
        row_to_post,
    )
    .map_err(Into::into)
}

pub fn find_by_id(pool: &DbPool, id: &str) -> AppResult<Option<Post>> {
    let conn = pool.get()?;
    let post = conn
        .query_row(
            "SELECT id, user_id, title, body, created_at, updated_at FROM posts WHERE id = ?1",
            params![id],
            row_to_post,
        )
        .optional()?;
    Ok(post)
}

pub fn update(pool: &DbPool, id: &str, title: &str, body: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute(
        "UPDATE posts SET title = ?1, body = ?2, updated_at = datetime('now') WHERE id = ?3",
        params![title, body, id],
    )?;
    Ok(())
}

pub fn delete(pool: &DbPool, id: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
    Ok(())
}

/// Newest-first page across all authors.
pub fn list_page(pool: &DbPool, page: u32) -> AppResult<Page> {
    let page = page.max(1);
    let conn = pool.get()?;

    let total: u32 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;

    let mut stmt = conn.prepare(
        "SELECT p.id, p.user_id, p.title, p.body, p.created_at, p.updated_at,
                u.username, u.avatar_file
         FROM posts p JOIN users u ON u.id = p.user_id
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT ?1 OFFSET ?2",
    )?;
    let items = stmt
        .query_map(
            params![POSTS_PER_PAGE, (page - 1) * POSTS_PER_PAGE],
            row_to_post_with_author,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Page {
        items,
        number: page,
        total,
    })
}

/// Newest-first page of a single author's posts.
pub fn list_by_author_page(pool: &DbPool, user_id: &str, page: u32) -> AppResult<Page> {
    let page = page.max(1);
    let conn = pool.get()?;

    let total: u32 = conn.query_row(
        "SELECT COUNT(*) FROM posts WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT p.id, p.user_id, p.title, p.body, p.created_at, p.updated_at,
                u.username, u.avatar_file
         FROM posts p JOIN users u ON u.id = p.user_id
         WHERE p.user_id = ?1
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT ?2 OFFSET ?3",
    )?;
    let items = stmt
        .query_map(
            params![user_id, POSTS_PER_PAGE, (page - 1) * POSTS_PER_PAGE],
            row_to_post_with_author,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Page {
        items,
        number: page,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::db::users;

    fn seed_user(pool: &DbPool, name: &str) -> String {
        users::create(pool, name, &format!("{name}@example.com"), "hash")
            .unwrap()
            .id
    }

    #[test]
    fn create_find_update_delete() {
        let pool = test_pool();
        let uid = seed_user(&pool, "alice");

        let post = create(&pool, &uid, "First", "Hello").unwrap();
        assert_eq!(post.title, "First");
        assert_eq!(post.user_id, uid);

        update(&pool, &post.id, "First!", "Hello again").unwrap();
        let updated = find_by_id(&pool, &post.id).unwrap().unwrap();
        assert_eq!(updated.title, "First!");
        assert_eq!(updated.body, "Hello again");

        delete(&pool, &post.id).unwrap();
        assert!(find_by_id(&pool, &post.id).unwrap().is_none());
    }

    #[test]
    fn list_page_windows_and_counts() {
        let pool = test_pool();
        let uid = seed_user(&pool, "alice");
        for i in 0..7 {
            create(&pool, &uid, &format!("Post {i}"), "body").unwrap();
        }

        let first = list_page(&pool, 1).unwrap();
        assert_eq!(first.total, 7);
        assert_eq!(first.items.len(), POSTS_PER_PAGE as usize);
        assert_eq!(first.total_pages(), 3);
        assert!(!first.has_prev());
        assert!(first.has_next());

        let last = list_page(&pool, 3).unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.has_prev());
        assert!(!last.has_next());
    }

    #[test]
    fn list_page_clamps_page_zero() {
        let pool = test_pool();
        let uid = seed_user(&pool, "alice");
        create(&pool, &uid, "Only", "body").unwrap();

        let page = list_page(&pool, 0).unwrap();
        assert_eq!(page.number, 1);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn empty_listing_still_has_one_page() {
        let pool = test_pool();
        let page = list_page(&pool, 1).unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_prev());
        assert!(!page.has_next());
    }

    #[test]
    fn author_page_filters_by_owner() {
        let pool = test_pool();
        let alice = seed_user(&pool, "alice");
        let bob = seed_user(&pool, "bob");
        create(&pool, &alice, "Alice 1", "body").unwrap();
        create(&pool, &bob, "Bob 1", "body").unwrap();
        create(&pool, &bob, "Bob 2", "body").unwrap();

        let page = list_by_author_page(&pool, &bob, 1).unwrap();
        assert_eq!(page.total, 2);
        assert!(page
            .items
            .iter()
            .all(|item| item.author_username == "bob"));
    }

    #[test]
    fn listing_joins_author_fields() {
        let pool = test_pool();
        let uid = seed_user(&pool, "alice");
        create(&pool, &uid, "Post", "body").unwrap();

        let page = list_page(&pool, 1).unwrap();
        let item = &page.items[0];
        assert_eq!(item.author_username, "alice");
        assert_eq!(item.author_avatar_url(), "/assets/img/default-avatar.svg");
    }
}
