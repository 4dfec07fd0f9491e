use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

const ENTITY: &str = "Doctor";

const DOCTOR_COLUMNS: &str =
    "id, full_name, email, date_of_birth, gender, phone, address, avatar, row_version";

struct DoctorRow {
    id: String,
    full_name: String,
    email: String,
    date_of_birth: String,
    gender: String,
    phone: String,
    address: String,
    avatar: Option<String>,
    row_version: i64,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DoctorRow> {
    Ok(DoctorRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        date_of_birth: row.get(3)?,
        gender: row.get(4)?,
        phone: row.get(5)?,
        address: row.get(6)?,
        avatar: row.get(7)?,
        row_version: row.get(8)?,
    })
}

fn doctor_from_row(row: DoctorRow) -> Result<Doctor, DatabaseError> {
    let date_of_birth = NaiveDate::parse_from_str(&row.date_of_birth, "%Y-%m-%d").map_err(|_| {
        DatabaseError::InvalidValue {
            field: "date_of_birth".into(),
            value: row.date_of_birth.clone(),
        }
    })?;

    Ok(Doctor {
        id: row.id,
        full_name: row.full_name,
        email: row.email,
        date_of_birth,
        gender: row.gender,
        phone: row.phone,
        address: row.address,
        avatar: row.avatar,
        row_version: row.row_version,
    })
}

fn map_write_error(err: rusqlite::Error, id: &str) -> DatabaseError {
    if let rusqlite::Error::SqliteFailure(ffi_err, msg) = &err {
        if ffi_err.code == rusqlite::ErrorCode::ConstraintViolation {
            if ffi_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY {
                return DatabaseError::Conflict {
                    entity_type: ENTITY.into(),
                    id: id.to_string(),
                };
            }
            return DatabaseError::ConstraintViolation(
                msg.clone().unwrap_or_else(|| ffi_err.to_string()),
            );
        }
    }
    err.into()
}

/// Insert a new doctor. The stored row starts at `row_version = 1`.
pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<Doctor, DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, full_name, email, date_of_birth, gender, phone, address, avatar, row_version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1)",
        params![
            doctor.id,
            doctor.full_name,
            doctor.email,
            doctor.date_of_birth.format("%Y-%m-%d").to_string(),
            doctor.gender,
            doctor.phone,
            doctor.address,
            doctor.avatar,
        ],
    )
    .map_err(|e| map_write_error(e, &doctor.id))?;

    Ok(Doctor {
        row_version: 1,
        ..doctor.clone()
    })
}

pub fn get_doctor(conn: &Connection, id: &str) -> Result<Option<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id], read_row) {
        Ok(row) => Ok(Some(doctor_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn doctor_exists(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let found: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM doctors WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?;
    Ok(found == 1)
}

/// Update every mutable field of a doctor.
///
/// The write only applies if the stored `row_version` still equals
/// `doctor.row_version`. When no row matches, the failure is reported as
/// `NotFound` if the id is gone and as `Concurrency` otherwise.
pub fn update_doctor(conn: &Connection, doctor: &Doctor) -> Result<Doctor, DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE doctors SET full_name = ?2, email = ?3, date_of_birth = ?4, gender = ?5,
             phone = ?6, address = ?7, avatar = ?8, row_version = row_version + 1
             WHERE id = ?1 AND row_version = ?9",
            params![
                doctor.id,
                doctor.full_name,
                doctor.email,
                doctor.date_of_birth.format("%Y-%m-%d").to_string(),
                doctor.gender,
                doctor.phone,
                doctor.address,
                doctor.avatar,
                doctor.row_version,
            ],
        )
        .map_err(|e| map_write_error(e, &doctor.id))?;

    if changed == 0 {
        return Err(if doctor_exists(conn, &doctor.id)? {
            DatabaseError::Concurrency {
                entity_type: ENTITY.into(),
                id: doctor.id.clone(),
            }
        } else {
            DatabaseError::NotFound {
                entity_type: ENTITY.into(),
                id: doctor.id.clone(),
            }
        });
    }

    Ok(Doctor {
        row_version: doctor.row_version + 1,
        ..doctor.clone()
    })
}

pub fn delete_doctor(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM doctors WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: ENTITY.into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Fetch one page of doctors whose id contains the filter substring.
///
/// Rows are ordered by id. A page past the end comes back empty with the
/// real `total_pages`.
pub fn list_doctors(conn: &Connection, filter: &DoctorFilter) -> Result<DoctorPage, DatabaseError> {
    let search = filter.id_contains.as_deref();

    let total_count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM doctors WHERE (?1 IS NULL OR instr(id, ?1) > 0)",
        params![search],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCTOR_COLUMNS} FROM doctors
         WHERE (?1 IS NULL OR instr(id, ?1) > 0)
         ORDER BY id
         LIMIT ?2 OFFSET ?3"
    ))?;

    let rows = stmt.query_map(
        params![search, DOCTOR_PAGE_SIZE, filter.offset()],
        read_row,
    )?;

    let doctors = rows
        .map(|r| r.map_err(DatabaseError::from).and_then(doctor_from_row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DoctorPage {
        doctors,
        current_page: filter.page.max(1),
        total_pages: total_pages(total_count),
        total_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_doctor(id: &str) -> Doctor {
        Doctor {
            id: id.into(),
            full_name: "Nguyen Van A".into(),
            email: "a@clinic.vn".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 5, 17).unwrap(),
            gender: "Male".into(),
            phone: "0123456789".into(),
            address: "12 Le Loi, District 1".into(),
            avatar: None,
            row_version: 0,
        }
    }

    #[test]
    fn doctor_insert_and_retrieve() {
        let conn = test_db();
        let stored = insert_doctor(&conn, &make_doctor("1234567890")).unwrap();
        assert_eq!(stored.row_version, 1);

        let fetched = get_doctor(&conn, "1234567890").unwrap().unwrap();
        assert_eq!(fetched, stored);
        assert!(fetched.avatar.is_none());
    }

    #[test]
    fn get_missing_doctor_returns_none() {
        let conn = test_db();
        assert!(get_doctor(&conn, "0000000000").unwrap().is_none());
    }

    #[test]
    fn duplicate_id_is_conflict() {
        let conn = test_db();
        insert_doctor(&conn, &make_doctor("1234567890")).unwrap();
        let err = insert_doctor(&conn, &make_doctor("1234567890")).unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict { .. }), "got {err:?}");
    }

    #[test]
    fn malformed_phone_is_constraint_violation() {
        let conn = test_db();
        let mut doctor = make_doctor("1234567890");
        doctor.phone = "12a4567890".into();
        let err = insert_doctor(&conn, &doctor).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)), "got {err:?}");
        assert!(!doctor_exists(&conn, "1234567890").unwrap());
    }

    #[test]
    fn update_bumps_row_version() {
        let conn = test_db();
        let mut stored = insert_doctor(&conn, &make_doctor("1234567890")).unwrap();
        stored.full_name = "Tran Thi B".into();
        stored.avatar = Some("Upload/img/doctor1234567890.png".into());

        let updated = update_doctor(&conn, &stored).unwrap();
        assert_eq!(updated.row_version, 2);

        let fetched = get_doctor(&conn, "1234567890").unwrap().unwrap();
        assert_eq!(fetched.full_name, "Tran Thi B");
        assert_eq!(fetched.avatar.as_deref(), Some("Upload/img/doctor1234567890.png"));
        assert_eq!(fetched.row_version, 2);
    }

    #[test]
    fn stale_update_is_concurrency_error() {
        let conn = test_db();
        let stored = insert_doctor(&conn, &make_doctor("1234567890")).unwrap();

        // First writer wins
        let mut first = stored.clone();
        first.address = "First".into();
        update_doctor(&conn, &first).unwrap();

        // Second writer still holds version 1
        let mut second = stored;
        second.address = "Second".into();
        let err = update_doctor(&conn, &second).unwrap_err();
        assert!(matches!(err, DatabaseError::Concurrency { .. }), "got {err:?}");

        let fetched = get_doctor(&conn, "1234567890").unwrap().unwrap();
        assert_eq!(fetched.address, "First");
    }

    #[test]
    fn update_of_missing_doctor_is_not_found() {
        let conn = test_db();
        let mut doctor = make_doctor("1234567890");
        doctor.row_version = 1;
        let err = update_doctor(&conn, &doctor).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }), "got {err:?}");
    }

    #[test]
    fn delete_removes_row() {
        let conn = test_db();
        insert_doctor(&conn, &make_doctor("1234567890")).unwrap();
        delete_doctor(&conn, "1234567890").unwrap();
        assert!(get_doctor(&conn, "1234567890").unwrap().is_none());

        let err = delete_doctor(&conn, "1234567890").unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn list_second_page_of_twelve() {
        let conn = test_db();
        for n in 1..=12 {
            insert_doctor(&conn, &make_doctor(&format!("{n:010}"))).unwrap();
        }

        let page = list_doctors(&conn, &DoctorFilter::new(None, Some(2))).unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_count, 12);
        assert_eq!(page.current_page, 2);
        let ids: Vec<&str> = page.doctors.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["0000000006", "0000000007", "0000000008", "0000000009", "0000000010"]
        );
    }

    #[test]
    fn list_never_exceeds_page_size() {
        let conn = test_db();
        for n in 1..=7 {
            insert_doctor(&conn, &make_doctor(&format!("{n:010}"))).unwrap();
        }
        let page = list_doctors(&conn, &DoctorFilter::new(None, None)).unwrap();
        assert_eq!(page.doctors.len(), DOCTOR_PAGE_SIZE as usize);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn list_past_last_page_is_empty() {
        let conn = test_db();
        insert_doctor(&conn, &make_doctor("1234567890")).unwrap();
        let page = list_doctors(&conn, &DoctorFilter::new(None, Some(9))).unwrap();
        assert!(page.doctors.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn list_filters_by_id_substring() {
        let conn = test_db();
        insert_doctor(&conn, &make_doctor("1234567890")).unwrap();
        insert_doctor(&conn, &make_doctor("9990001111")).unwrap();
        insert_doctor(&conn, &make_doctor("5556667777")).unwrap();

        let page = list_doctors(&conn, &DoctorFilter::new(Some("999".into()), None)).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.doctors[0].id, "9990001111");

        let none = list_doctors(&conn, &DoctorFilter::new(Some("xyz".into()), None)).unwrap();
        assert!(none.doctors.is_empty());
        assert_eq!(none.total_pages, 0);
    }

    #[test]
    fn list_search_is_case_sensitive() {
        let conn = test_db();
        insert_doctor(&conn, &make_doctor("AB12345678")).unwrap();

        let upper = list_doctors(&conn, &DoctorFilter::new(Some("AB".into()), None)).unwrap();
        assert_eq!(upper.total_count, 1);
        let lower = list_doctors(&conn, &DoctorFilter::new(Some("ab".into()), None)).unwrap();
        assert_eq!(lower.total_count, 0);
    }
}
