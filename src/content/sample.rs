use serde_json::{Value, json};

/// Six-entry demonstration document mixing posts and reels.
pub fn sample_document() -> Value {
    json!({
        "post_1": {
            "content": "Welcome to our new product launch! 🚀",
            "caption": "Exciting news coming your way! #ProductLaunch #Innovation",
            "music": "upbeat-intro.mp3",
            "type": "post"
        },
        "post_2": {
            "content": "Check out our latest video tutorial",
            "caption": "Learn something new today! 📚 #Tutorial #Learning",
            "music": "background-music.mp3",
            "type": "video",
            "duration": 20
        },
        "post_3": {
            "content": "Special offer: 50% OFF this weekend only!",
            "caption": "Don't miss out on this amazing deal! 🎉 #Sale #Weekend",
            "music": "energetic-beat.mp3",
            "type": "post"
        },
        "post_4": {
            "content": "Behind the scenes of our creative process",
            "caption": "Creating magic ✨ #BehindTheScenes #Creative",
            "music": "chill-vibes.mp3",
            "type": "video",
            "duration": 30
        },
        "post_5": {
            "content": "Monday Motivation: You got this! 💪",
            "caption": "Start your week strong! #MondayMotivation #Success",
            "music": "motivational.mp3",
            "type": "post"
        },
        "post_6": {
            "content": "Quick tips for productivity",
            "caption": "Work smarter, not harder 🎯 #Productivity #Tips",
            "music": "focus-music.mp3",
            "type": "video",
            "duration": 15
        }
    })
}

/// [`sample_document`] pretty-printed.
pub fn sample_json_pretty() -> String {
    serde_json::to_string_pretty(&sample_document()).unwrap_or_else(|_| "{}".to_owned())
}
