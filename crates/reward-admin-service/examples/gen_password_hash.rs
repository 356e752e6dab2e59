//! 生成管理员密码哈希
//!
//! 用于初始化 users 表中的管理员账号。
//! 运行: cargo run -p reward-admin-service --example gen_password_hash -- <密码>...

use reward_admin_service::auth::{hash_password, verify_password};

fn main() {
    let mut passwords: Vec<String> = std::env::args().skip(1).collect();
    if passwords.is_empty() {
        passwords.push("admin123".to_string());
    }

    for password in &passwords {
        match hash_password(password) {
            Ok(hashed) => {
                println!("Password: {} | Hash: {}", password, hashed);
                match verify_password(password, &hashed) {
                    Ok(true) => println!("  ✓ Verification passed"),
                    Ok(false) => println!("  ✗ Verification failed"),
                    Err(e) => println!("  ✗ Error: {}", e),
                }
            }
            Err(e) => eprintln!("Error hashing {}: {}", password, e),
        }
        println!();
    }
}
