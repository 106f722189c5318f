use flatfs::{FsError, Volume};

pub fn main() {
    let mut vol = Volume::builder()
        .with_capacity(4)
        .build()
        .expect("should build");

    println!("a -> {:?}", vol.create("a", 2048).unwrap());
    println!("b -> {:?}", vol.create("b", 1024).unwrap());

    match vol.create("c", 2048) {
        Err(FsError::DiskFull { needed, obtained }) => {
            println!("c -> disk full, wanted {} got {}", needed, obtained)
        }
        other => println!("c -> {:?}", other),
    }
    println!("orphaned: {:?}", vol.orphaned_blocks());

    vol.delete("a").unwrap();
    println!("d -> {:?}", vol.create("d", 1024).unwrap());
    println!("{:?}", vol.usage());
}
